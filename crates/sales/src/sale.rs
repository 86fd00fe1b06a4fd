use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salonstock_core::{DomainError, DomainResult, ProductId, SaleId, ServiceId, Volume};

/// One product requirement inside a service line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequirement {
    pub product_id: ProductId,
    pub volume: Volume,
}

/// One service within a sale and the product volumes it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub service_id: ServiceId,
    pub requirements: Vec<LineRequirement>,
}

impl SaleLine {
    pub fn new(service_id: ServiceId, requirements: Vec<LineRequirement>) -> Self {
        Self {
            service_id,
            requirements,
        }
    }
}

/// A checkout request: every service performed in one till transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub sale_id: SaleId,
    pub lines: Vec<SaleLine>,
    pub created_at: DateTime<Utc>,
}

impl SaleRequest {
    pub fn new(sale_id: SaleId, lines: Vec<SaleLine>, created_at: DateTime<Utc>) -> Self {
        Self {
            sale_id,
            lines,
            created_at,
        }
    }

    /// Reject malformed requests before any stock is touched.
    ///
    /// Zero-volume requirements are refused rather than silently skipped:
    /// a service configured to use nothing of a product is a catalog bug.
    pub fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation("sale has no service lines"));
        }
        for line in &self.lines {
            if line.requirements.is_empty() {
                return Err(DomainError::validation(format!(
                    "service {} requires no products",
                    line.service_id
                )));
            }
            for req in &line.requirements {
                if req.volume.is_zero() {
                    return Err(DomainError::validation(format!(
                        "service {} requires zero volume of product {}",
                        line.service_id, req.product_id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Sum the requirement per product across every service in the sale.
    ///
    /// A product used by two services is validated against its combined
    /// volume, never twice independently. The map is ordered by product id,
    /// which also fixes the commit order.
    pub fn combined_requirements(&self) -> DomainResult<BTreeMap<ProductId, Volume>> {
        let mut combined: BTreeMap<ProductId, Volume> = BTreeMap::new();
        for line in &self.lines {
            for req in &line.requirements {
                let entry = combined.entry(req.product_id).or_insert(Volume::ZERO);
                *entry = entry.checked_add(req.volume).ok_or_else(|| {
                    DomainError::validation(format!(
                        "combined requirement for product {} overflows",
                        req.product_id
                    ))
                })?;
            }
        }
        Ok(combined)
    }

    /// Product ids touched by this sale, sorted and deduplicated. The sorted
    /// order doubles as the lock-acquisition order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self
            .lines
            .iter()
            .flat_map(|l| l.requirements.iter().map(|r| r.product_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// One consumption-log entry: one product drawn for one service line of one
/// sale. Append-only audit data for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionLogEntry {
    pub sale_id: SaleId,
    pub service_id: ServiceId,
    pub product_id: ProductId,
    pub requested: Volume,
    pub consumed: Volume,
    pub containers_opened: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Outcome of a committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale_id: SaleId,
    /// One entry per product per sale line, in commit order.
    pub entries: Vec<ConsumptionLogEntry>,
    pub committed_at: DateTime<Utc>,
}

impl SaleReceipt {
    /// Total volume drawn across the whole sale.
    pub fn total_consumed(&self) -> Volume {
        self.entries.iter().map(|e| e.consumed).sum()
    }

    /// Sealed containers opened across the whole sale.
    pub fn containers_opened(&self) -> u32 {
        self.entries.iter().map(|e| e.containers_opened).sum()
    }
}
