//! `salonstock-inventory` — bottle-based stock model.
//!
//! Products are stocked as a number of sealed containers plus at most one
//! partially-used open container. This crate holds the stock record itself,
//! the consumption engine that draws fractional volumes from it, the restock
//! operation, and the stock status classifier. Everything here is pure:
//! functions take a record and return a new one, no IO, no shared state.

pub mod engine;
pub mod record;
pub mod restock;
pub mod status;

pub use engine::{ConsumptionRequest, ConsumptionResult, OriginContext, consume};
pub use record::StockRecord;
pub use restock::{RestockAudit, RestockBatch, restock};
pub use status::{StockStatus, ThresholdPolicy, classify, classify_with};
