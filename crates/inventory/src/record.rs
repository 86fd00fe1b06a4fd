use serde::{Deserialize, Serialize};

use salonstock_core::{DomainError, DomainResult, Entity, ProductId, Volume};

use crate::status::{StockStatus, ThresholdPolicy, classify, classify_with};

/// Per-product inventory state.
///
/// A product is stocked as `sealed_containers` full containers of
/// `container_capacity` each, plus at most one open container holding
/// `open_remaining` (strictly less than the capacity; zero means nothing is
/// open). Records are created when a product is cataloged, decreased only by
/// the consumption engine, increased only by restocks, and zeroed rather
/// than deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    product_id: ProductId,
    sealed_containers: u32,
    container_capacity: Volume,
    open_remaining: Volume,
    min_stock_threshold: Volume,
}

impl StockRecord {
    /// Catalog a new product: zero containers, nothing open.
    pub fn new(
        product_id: ProductId,
        container_capacity: Volume,
        min_stock_threshold: Volume,
    ) -> DomainResult<Self> {
        Self::from_parts(product_id, 0, container_capacity, Volume::ZERO, min_stock_threshold)
    }

    /// Rehydrate a record from stored fields, re-validating every invariant.
    ///
    /// Storage rows are not trusted: a capacity of zero or an open remainder
    /// at or above capacity is rejected here rather than poisoning later
    /// arithmetic.
    pub fn from_parts(
        product_id: ProductId,
        sealed_containers: u32,
        container_capacity: Volume,
        open_remaining: Volume,
        min_stock_threshold: Volume,
    ) -> DomainResult<Self> {
        if container_capacity.is_zero() {
            return Err(DomainError::configuration(format!(
                "product {product_id}: container capacity must be positive"
            )));
        }
        if open_remaining >= container_capacity {
            return Err(DomainError::invariant(format!(
                "product {product_id}: open remainder {open_remaining} must be below capacity {container_capacity}"
            )));
        }
        let record = Self {
            product_id,
            sealed_containers,
            container_capacity,
            open_remaining,
            min_stock_threshold,
        };
        // Reject stock levels whose total would overflow the fixed-point range.
        record.total_available_checked()?;
        Ok(record)
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn sealed_containers(&self) -> u32 {
        self.sealed_containers
    }

    pub fn container_capacity(&self) -> Volume {
        self.container_capacity
    }

    /// Volume left in the currently open container; zero means none is open.
    pub fn open_remaining(&self) -> Volume {
        self.open_remaining
    }

    pub fn min_stock_threshold(&self) -> Volume {
        self.min_stock_threshold
    }

    /// Sealed containers' combined capacity plus the open remainder.
    pub fn total_available(&self) -> Volume {
        // Overflow is ruled out at construction (`from_parts`).
        self.container_capacity
            .checked_mul_count(self.sealed_containers)
            .and_then(|sealed| sealed.checked_add(self.open_remaining))
            .unwrap_or(Volume::ZERO)
    }

    fn total_available_checked(&self) -> DomainResult<Volume> {
        self.container_capacity
            .checked_mul_count(self.sealed_containers)
            .and_then(|sealed| sealed.checked_add(self.open_remaining))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "product {}: total available volume overflows",
                    self.product_id
                ))
            })
    }

    /// Derived stock status under the default threshold policy.
    pub fn status(&self) -> StockStatus {
        classify(self.total_available(), self.min_stock_threshold)
    }

    /// Derived stock status under a deployment-tuned policy.
    pub fn status_with(&self, policy: &ThresholdPolicy) -> StockStatus {
        classify_with(self.total_available(), self.min_stock_threshold, policy)
    }

    /// Replace the container counts, preserving identity and configuration.
    ///
    /// Crate-internal: only the consumption engine and the restock operation
    /// produce new counts, and both uphold the open-below-capacity invariant.
    pub(crate) fn with_stock(&self, sealed_containers: u32, open_remaining: Volume) -> Self {
        debug_assert!(open_remaining < self.container_capacity);
        Self {
            sealed_containers,
            open_remaining,
            ..self.clone()
        }
    }
}

impl Entity for StockRecord {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}
