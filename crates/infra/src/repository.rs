//! Abstract stock storage.
//!
//! The core never talks to a concrete database; checkout surfaces hand it a
//! [`StockRepository`]. The contract deliberately returns the updated record
//! from `save` so callers never re-read whole collections to observe their
//! own writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use salonstock_core::ProductId;
use salonstock_inventory::{RestockAudit, StockRecord};
use salonstock_sales::ConsumptionLogEntry;

/// Repository-level failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store is unusable (poisoned lock, lost connection, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored row failed domain validation during rehydration.
    #[error("corrupt stock row for product {product_id}: {reason}")]
    Corrupt {
        product_id: ProductId,
        reason: String,
    },
}

/// Storage seam for stock records and their append-only audit logs.
///
/// Implementations must be safe for concurrent readers; write serialization
/// for the commit path is the coordinator's job (via the lock registry), not
/// the repository's.
pub trait StockRepository: Send + Sync {
    /// Fetch one record; `None` when the product was never cataloged.
    fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, StorageError>;

    /// Persist a record, returning the stored state.
    fn save(&self, record: StockRecord) -> Result<StockRecord, StorageError>;

    /// Persist a batch of records plus their consumption-log entries as one
    /// atomic unit: on error, nothing is applied. The commit path goes
    /// through this so a mid-batch storage failure can never leave some
    /// products decremented and others not.
    fn save_all(
        &self,
        records: Vec<StockRecord>,
        entries: Vec<ConsumptionLogEntry>,
    ) -> Result<(), StorageError>;

    /// Consistent point-in-time view of the requested products. Missing
    /// products are simply absent from the map.
    fn snapshot(
        &self,
        product_ids: &[ProductId],
    ) -> Result<BTreeMap<ProductId, StockRecord>, StorageError>;

    /// All cataloged records (dashboard reads).
    fn list(&self) -> Result<Vec<StockRecord>, StorageError>;

    /// Append one consumption-log entry. Append-only.
    fn append_consumption(&self, entry: ConsumptionLogEntry) -> Result<(), StorageError>;

    /// Append one restock audit entry. Append-only.
    fn append_restock(&self, audit: RestockAudit) -> Result<(), StorageError>;

    /// Consumption history for one product, oldest first.
    fn consumption_log(&self, product_id: ProductId) -> Result<Vec<ConsumptionLogEntry>, StorageError>;

    /// Restock history for one product, oldest first.
    fn restock_log(&self, product_id: ProductId) -> Result<Vec<RestockAudit>, StorageError>;
}

impl<R> StockRepository for Arc<R>
where
    R: StockRepository + ?Sized,
{
    fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, StorageError> {
        (**self).get(product_id)
    }

    fn save(&self, record: StockRecord) -> Result<StockRecord, StorageError> {
        (**self).save(record)
    }

    fn save_all(
        &self,
        records: Vec<StockRecord>,
        entries: Vec<ConsumptionLogEntry>,
    ) -> Result<(), StorageError> {
        (**self).save_all(records, entries)
    }

    fn snapshot(
        &self,
        product_ids: &[ProductId],
    ) -> Result<BTreeMap<ProductId, StockRecord>, StorageError> {
        (**self).snapshot(product_ids)
    }

    fn list(&self) -> Result<Vec<StockRecord>, StorageError> {
        (**self).list()
    }

    fn append_consumption(&self, entry: ConsumptionLogEntry) -> Result<(), StorageError> {
        (**self).append_consumption(entry)
    }

    fn append_restock(&self, audit: RestockAudit) -> Result<(), StorageError> {
        (**self).append_restock(audit)
    }

    fn consumption_log(&self, product_id: ProductId) -> Result<Vec<ConsumptionLogEntry>, StorageError> {
        (**self).consumption_log(product_id)
    }

    fn restock_log(&self, product_id: ProductId) -> Result<Vec<RestockAudit>, StorageError> {
        (**self).restock_log(product_id)
    }
}
