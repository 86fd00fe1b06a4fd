//! Sale transaction coordination (application-level orchestration).
//!
//! The coordinator composes the pure domain pieces with the stateful ones:
//!
//! ```text
//! SaleRequest
//!   ↓
//! 1. Validate the request (shape, non-zero volumes)
//!   ↓
//! 2. Acquire the per-product locks for the whole sale (bounded wait)
//!   ↓
//! 3. Dry-run combined requirements against a snapshot (no mutation)
//!   ↓
//! 4. Commit: consume per product per line in stable order, all in memory
//!   ↓
//! 5. Persist records + consumption-log entries, then feed status
//!    transitions to the alert emitter
//! ```
//!
//! Either every required product is decremented or none are: a sale that
//! fails validation, locking, or feasibility returns a typed rejection
//! before anything is persisted. Cancelling before `commit_sale` is simply
//! not calling it; a committed sale is reversed only by a compensating
//! restock.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use salonstock_alerts::{AlertEmitter, StockAlert};
use salonstock_core::{DomainError, ProductId, Volume};
use salonstock_events::EventBus;
use salonstock_inventory::{
    ConsumptionRequest, ConsumptionResult, RestockBatch, StockRecord, StockStatus,
    ThresholdPolicy, consume, restock,
};
use salonstock_sales::{ConsumptionLogEntry, SaleReceipt, SaleRequest, Shortfall, check_feasibility};

use crate::locks::{LockTimeout, ProductLockRegistry};
use crate::repository::{StockRepository, StorageError};

/// Typed rejection of a sale or stock operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaleError {
    /// Malformed request; nothing was touched.
    #[error("validation failed: {0}")]
    Validation(String),

    /// One or more products cannot cover their combined requirement.
    /// Never retried automatically; the caller renders the full list.
    #[error("insufficient stock for {} product(s)", shortfalls.len())]
    InsufficientStock { shortfalls: Vec<Shortfall> },

    /// The sale references a product that was never cataloged.
    #[error("product {0} is not cataloged")]
    UnknownProduct(ProductId),

    /// Commit locks not acquired in time. Safe to retry.
    #[error(transparent)]
    LockTimeout(#[from] LockTimeout),

    /// A product's stock configuration is broken (e.g. zero capacity).
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DomainError> for SaleError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => SaleError::Validation(msg),
            DomainError::InvariantViolation(msg) => SaleError::Validation(msg),
            DomainError::Configuration(msg) => SaleError::Configuration(msg),
            DomainError::InvalidId(msg) => SaleError::Validation(msg),
            DomainError::NotFound => SaleError::Validation("record not found".to_string()),
        }
    }
}

/// One row of the dashboard low-stock report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StockHealth {
    pub product_id: ProductId,
    pub status: StockStatus,
    pub total_available: Volume,
    pub min_stock_threshold: Volume,
}

/// Orchestrates sales, restocks, and alerting over an abstract repository.
pub struct StockCoordinator<R, B> {
    repository: R,
    locks: ProductLockRegistry,
    alerts: AlertEmitter<B>,
    lock_timeout: Duration,
    policy: ThresholdPolicy,
}

impl<R, B> StockCoordinator<R, B>
where
    R: StockRepository,
    B: EventBus<StockAlert>,
{
    pub fn new(repository: R, bus: B) -> Self {
        Self {
            repository,
            locks: ProductLockRegistry::new(),
            alerts: AlertEmitter::new(bus),
            lock_timeout: Duration::from_secs(5),
            policy: ThresholdPolicy::default(),
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn with_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Catalog a new product: an empty stock record waiting for its first
    /// restock.
    pub fn catalog_product(
        &self,
        product_id: ProductId,
        container_capacity: Volume,
        min_stock_threshold: Volume,
    ) -> Result<StockRecord, SaleError> {
        let record = StockRecord::new(product_id, container_capacity, min_stock_threshold)?;
        Ok(self.repository.save(record)?)
    }

    /// Validate a sale against current stock without mutating anything.
    ///
    /// Lock-free: checkout previews tolerate a stale read; the commit path
    /// re-checks under its locks.
    pub fn dry_run(&self, sale: &SaleRequest) -> Result<(), SaleError> {
        sale.validate()?;
        let requirements = sale.combined_requirements()?;
        let product_ids = sale.product_ids();
        let snapshot = self.repository.snapshot(&product_ids)?;

        for product_id in &product_ids {
            if !snapshot.contains_key(product_id) {
                return Err(SaleError::UnknownProduct(*product_id));
            }
        }

        let shortfalls = check_feasibility(&requirements, &snapshot);
        if shortfalls.is_empty() {
            Ok(())
        } else {
            Err(SaleError::InsufficientStock { shortfalls })
        }
    }

    /// Commit a sale: all required products decremented, or none.
    pub fn commit_sale(&self, sale: &SaleRequest) -> Result<SaleReceipt, SaleError> {
        sale.validate()?;
        let requirements = sale.combined_requirements()?;
        let product_ids = sale.product_ids();

        let _guard = self.locks.acquire(&product_ids, self.lock_timeout)?;

        let mut working = self.repository.snapshot(&product_ids)?;
        for product_id in &product_ids {
            if !working.contains_key(product_id) {
                return Err(SaleError::UnknownProduct(*product_id));
            }
        }

        let shortfalls = check_feasibility(&requirements, &working);
        if !shortfalls.is_empty() {
            tracing::warn!(
                sale_id = %sale.sale_id,
                shortfalls = shortfalls.len(),
                "sale rejected: insufficient stock"
            );
            return Err(SaleError::InsufficientStock { shortfalls });
        }

        // Commit phase, computed entirely in memory first. Product order is
        // stable (sorted ids); within a product, lines apply in sale order.
        let committed_at = Utc::now();
        let mut entries = Vec::new();
        let mut transitions: Vec<(ProductId, StockStatus)> = Vec::new();

        for &product_id in &product_ids {
            let record = &working[&product_id];
            let status_before = record.status_with(&self.policy);
            let mut current = record.clone();

            for line in &sale.lines {
                for requirement in &line.requirements {
                    if requirement.product_id != product_id {
                        continue;
                    }
                    let result = consume(&current, requirement.volume)?;
                    if !result.fully_satisfied() {
                        // The feasibility check passed under our locks, so a
                        // shortfall here means the repository lied about the
                        // snapshot. Reject; nothing has been persisted.
                        return Err(SaleError::InsufficientStock {
                            shortfalls: vec![Shortfall {
                                product_id,
                                required: requirement.volume,
                                available: result.consumed,
                            }],
                        });
                    }
                    entries.push(ConsumptionLogEntry {
                        sale_id: sale.sale_id,
                        service_id: line.service_id,
                        product_id,
                        requested: requirement.volume,
                        consumed: result.consumed,
                        containers_opened: result.containers_opened,
                        occurred_at: committed_at,
                    });
                    current = result.record;
                }
            }

            transitions.push((product_id, status_before));
            working.insert(product_id, current);
        }

        // Persist the whole batch atomically, then alert. A storage failure
        // here rolls the sale back wholesale; no product is decremented.
        self.repository
            .save_all(working.values().cloned().collect(), entries.clone())?;

        for (product_id, status_before) in transitions {
            let record = &working[&product_id];
            self.notify_alert(product_id, status_before, record, committed_at);
        }

        tracing::info!(
            sale_id = %sale.sale_id,
            products = product_ids.len(),
            entries = entries.len(),
            "sale committed"
        );

        Ok(SaleReceipt {
            sale_id: sale.sale_id,
            entries,
            committed_at,
        })
    }

    /// Apply a standalone consumption outside a sale (e.g. a product-usage
    /// correction). Partial satisfaction is allowed here: the result
    /// reports the shortfall and whatever was actually drawn is applied,
    /// exactly like the engine primitive.
    pub fn apply_consumption(
        &self,
        request: &ConsumptionRequest,
    ) -> Result<ConsumptionResult, SaleError> {
        let _guard = self
            .locks
            .acquire(&[request.product_id], self.lock_timeout)?;

        let record = self
            .repository
            .get(request.product_id)?
            .ok_or(SaleError::UnknownProduct(request.product_id))?;
        let status_before = record.status_with(&self.policy);
        let occurred_at = Utc::now();

        let result = consume(&record, request.requested)?;
        let saved = self.repository.save(result.record.clone())?;

        // Ad-hoc draws only reach the sale-keyed consumption log when their
        // origin names a sale line.
        if let (Some(sale_id), Some(service_id)) = (request.origin.sale_id, request.origin.service_id)
        {
            self.repository.append_consumption(ConsumptionLogEntry {
                sale_id,
                service_id,
                product_id: request.product_id,
                requested: request.requested,
                consumed: result.consumed,
                containers_opened: result.containers_opened,
                occurred_at,
            })?;
        }

        self.notify_alert(request.product_id, status_before, &saved, occurred_at);
        Ok(result)
    }

    /// Apply a supplier delivery and record its audit entry.
    pub fn apply_restock(&self, batch: &RestockBatch) -> Result<StockRecord, SaleError> {
        let _guard = self.locks.acquire(&[batch.product_id], self.lock_timeout)?;

        let record = self
            .repository
            .get(batch.product_id)?
            .ok_or(SaleError::UnknownProduct(batch.product_id))?;
        let status_before = record.status_with(&self.policy);

        let (updated, audit) = restock(&record, batch)?;
        let saved = self.repository.save(updated)?;
        self.repository.append_restock(audit)?;

        self.notify_alert(batch.product_id, status_before, &saved, batch.received_at);

        tracing::info!(
            product_id = %batch.product_id,
            containers_added = batch.containers_added,
            "restock applied"
        );

        Ok(saved)
    }

    /// Current status of one product. Lock-free dashboard read.
    pub fn product_status(&self, product_id: ProductId) -> Result<StockStatus, SaleError> {
        let record = self
            .repository
            .get(product_id)?
            .ok_or(SaleError::UnknownProduct(product_id))?;
        Ok(record.status_with(&self.policy))
    }

    /// Every product currently below its threshold, for the restock screen.
    /// Lock-free snapshot read; eventual consistency is fine here.
    pub fn low_stock_report(&self) -> Result<Vec<StockHealth>, SaleError> {
        let mut rows: Vec<StockHealth> = self
            .repository
            .list()?
            .into_iter()
            .filter_map(|record| {
                let status = record.status_with(&self.policy);
                if status == StockStatus::Good {
                    return None;
                }
                Some(StockHealth {
                    product_id: record.product_id(),
                    status,
                    total_available: record.total_available(),
                    min_stock_threshold: record.min_stock_threshold(),
                })
            })
            .collect();
        rows.sort_by_key(|row| row.product_id);
        Ok(rows)
    }

    #[cfg(test)]
    pub(crate) fn locks(&self) -> &ProductLockRegistry {
        &self.locks
    }

    fn notify_alert(
        &self,
        product_id: ProductId,
        status_before: StockStatus,
        record: &StockRecord,
        occurred_at: chrono::DateTime<Utc>,
    ) {
        let status_after = record.status_with(&self.policy);
        // Stock is already persisted; a bus hiccup must not fail the
        // operation, only the notification.
        if let Err(err) = self.alerts.observe(
            product_id,
            status_before,
            status_after,
            record.total_available(),
            occurred_at,
        ) {
            tracing::error!(product_id = %product_id, ?err, "failed to publish stock alert");
        }
    }
}
