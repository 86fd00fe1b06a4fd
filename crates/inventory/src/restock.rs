//! Restock operation: append sealed containers from a supplier delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use salonstock_core::{DomainError, DomainResult, ProductId, SupplierId, Volume};

use crate::record::StockRecord;

/// A supplier delivery for one product.
///
/// Supplier and cost are audit metadata; the arithmetic impact is exactly
/// `sealed_containers += containers_added`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockBatch {
    pub product_id: ProductId,
    pub containers_added: u32,
    pub supplier: Option<SupplierId>,
    /// Purchase cost in smallest currency unit (e.g., cents).
    pub cost_cents: Option<u64>,
    pub received_at: DateTime<Utc>,
}

impl RestockBatch {
    pub fn new(product_id: ProductId, containers_added: u32, received_at: DateTime<Utc>) -> Self {
        Self {
            product_id,
            containers_added,
            supplier: None,
            cost_cents: None,
            received_at,
        }
    }

    pub fn with_supplier(mut self, supplier: SupplierId) -> Self {
        self.supplier = Some(supplier);
        self
    }

    pub fn with_cost_cents(mut self, cost_cents: u64) -> Self {
        self.cost_cents = Some(cost_cents);
        self
    }
}

/// Append-only audit entry recorded for every restock. Never mutates stock
/// state retroactively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockAudit {
    pub audit_id: Uuid,
    pub product_id: ProductId,
    pub containers_added: u32,
    /// Sealed volume added by this batch (`containers_added * capacity`).
    pub volume_added: Volume,
    pub supplier: Option<SupplierId>,
    pub cost_cents: Option<u64>,
    pub recorded_at: DateTime<Utc>,
}

/// Add `batch.containers_added` sealed containers to `record`.
///
/// The open container is untouched: a delivery never tops up a bottle that
/// is already in use. Returns the new record plus the audit entry describing
/// the delivery.
pub fn restock(
    record: &StockRecord,
    batch: &RestockBatch,
) -> DomainResult<(StockRecord, RestockAudit)> {
    if batch.product_id != record.product_id() {
        return Err(DomainError::validation(format!(
            "restock batch for {} applied to record {}",
            batch.product_id,
            record.product_id()
        )));
    }
    if batch.containers_added == 0 {
        return Err(DomainError::validation(
            "restock must add at least one container",
        ));
    }

    let sealed = record
        .sealed_containers()
        .checked_add(batch.containers_added)
        .ok_or_else(|| {
            DomainError::validation(format!(
                "product {}: sealed container count overflows",
                record.product_id()
            ))
        })?;

    // The new total must stay inside the fixed-point range, or every later
    // total_available() read would be garbage.
    record
        .container_capacity()
        .checked_mul_count(sealed)
        .and_then(|v| v.checked_add(record.open_remaining()))
        .ok_or_else(|| {
            DomainError::validation(format!(
                "product {}: restocked total volume overflows",
                record.product_id()
            ))
        })?;

    let volume_added = record
        .container_capacity()
        .checked_mul_count(batch.containers_added)
        .ok_or_else(|| {
            DomainError::validation(format!(
                "product {}: restocked volume overflows",
                record.product_id()
            ))
        })?;

    let updated = record.with_stock(sealed, record.open_remaining());

    let audit = RestockAudit {
        audit_id: Uuid::now_v7(),
        product_id: record.product_id(),
        containers_added: batch.containers_added,
        volume_added,
        supplier: batch.supplier,
        cost_cents: batch.cost_cents,
        recorded_at: batch.received_at,
    };

    Ok((updated, audit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StockStatus;

    fn test_record(sealed: u32, open_ml: u64) -> StockRecord {
        StockRecord::from_parts(
            ProductId::new(),
            sealed,
            Volume::from_ml(1000),
            Volume::from_ml(open_ml),
            Volume::from_ml(100),
        )
        .unwrap()
    }

    #[test]
    fn restock_adds_sealed_containers_only() {
        let record = test_record(1, 250);
        let batch = RestockBatch::new(record.product_id(), 3, Utc::now());

        let (updated, audit) = restock(&record, &batch).unwrap();

        assert_eq!(updated.sealed_containers(), 4);
        assert_eq!(updated.open_remaining(), Volume::from_ml(250));
        assert_eq!(audit.containers_added, 3);
        assert_eq!(audit.volume_added, Volume::from_ml(3000));
    }

    #[test]
    fn restocking_an_empty_record_restores_good_status() {
        let record = test_record(0, 0);
        assert_eq!(record.status(), StockStatus::Out);

        let batch = RestockBatch::new(record.product_id(), 3, Utc::now());
        let (updated, _) = restock(&record, &batch).unwrap();

        assert_eq!(updated.sealed_containers(), 3);
        assert_eq!(updated.status(), StockStatus::Good);
    }

    #[test]
    fn zero_container_batch_is_rejected() {
        let record = test_record(1, 0);
        let batch = RestockBatch::new(record.product_id(), 0, Utc::now());

        let err = restock(&record, &batch).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn batch_for_another_product_is_rejected() {
        let record = test_record(1, 0);
        let batch = RestockBatch::new(ProductId::new(), 2, Utc::now());

        let err = restock(&record, &batch).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn audit_carries_supplier_and_cost_metadata() {
        let record = test_record(0, 0);
        let supplier = SupplierId::new();
        let batch = RestockBatch::new(record.product_id(), 2, Utc::now())
            .with_supplier(supplier)
            .with_cost_cents(4_500);

        let (_, audit) = restock(&record, &batch).unwrap();

        assert_eq!(audit.supplier, Some(supplier));
        assert_eq!(audit.cost_cents, Some(4_500));
    }
}
