//! In-memory stock repository for tests/dev and single-process deployments.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use salonstock_core::ProductId;
use salonstock_inventory::{RestockAudit, StockRecord};
use salonstock_sales::ConsumptionLogEntry;

use crate::repository::{StockRepository, StorageError};

/// RwLock'd maps standing in for the products, consumption-log, and
/// restock-batch tables.
#[derive(Debug, Default)]
pub struct InMemoryStockRepository {
    records: RwLock<HashMap<ProductId, StockRecord>>,
    consumption: RwLock<Vec<ConsumptionLogEntry>>,
    restocks: RwLock<Vec<RestockAudit>>,
}

impl InMemoryStockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly (test/catalog setup).
    pub fn insert(&self, record: StockRecord) -> Result<(), StorageError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        records.insert(record.product_id(), record);
        Ok(())
    }
}

impl StockRepository for InMemoryStockRepository {
    fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(records.get(&product_id).cloned())
    }

    fn save(&self, record: StockRecord) -> Result<StockRecord, StorageError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        records.insert(record.product_id(), record.clone());
        Ok(record)
    }

    fn save_all(
        &self,
        new_records: Vec<StockRecord>,
        entries: Vec<ConsumptionLogEntry>,
    ) -> Result<(), StorageError> {
        // Take both write locks before touching either table so the batch
        // lands atomically: a failure here mutates nothing.
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let mut log = self
            .consumption
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        for record in new_records {
            records.insert(record.product_id(), record);
        }
        log.extend(entries);
        Ok(())
    }

    fn snapshot(
        &self,
        product_ids: &[ProductId],
    ) -> Result<BTreeMap<ProductId, StockRecord>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(product_ids
            .iter()
            .filter_map(|id| records.get(id).map(|r| (*id, r.clone())))
            .collect())
    }

    fn list(&self) -> Result<Vec<StockRecord>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(records.values().cloned().collect())
    }

    fn append_consumption(&self, entry: ConsumptionLogEntry) -> Result<(), StorageError> {
        let mut log = self
            .consumption
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        log.push(entry);
        Ok(())
    }

    fn append_restock(&self, audit: RestockAudit) -> Result<(), StorageError> {
        let mut log = self
            .restocks
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        log.push(audit);
        Ok(())
    }

    fn consumption_log(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ConsumptionLogEntry>, StorageError> {
        let log = self
            .consumption
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(log
            .iter()
            .filter(|e| e.product_id == product_id)
            .cloned()
            .collect())
    }

    fn restock_log(&self, product_id: ProductId) -> Result<Vec<RestockAudit>, StorageError> {
        let log = self
            .restocks
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(log
            .iter()
            .filter(|a| a.product_id == product_id)
            .cloned()
            .collect())
    }
}
