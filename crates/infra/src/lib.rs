//! Infrastructure layer: repositories, per-product locking, orchestration.
//!
//! The domain crates are pure; this crate supplies the stateful pieces: an
//! abstract stock repository with an in-memory reference implementation, a
//! per-product lock registry that serializes commit-phase mutation, and the
//! [`StockCoordinator`] that runs the dry-run/commit sale protocol and the
//! restock flow end to end.

pub mod coordinator;
pub mod in_memory;
pub mod locks;
pub mod repository;


pub use coordinator::{SaleError, StockCoordinator, StockHealth};
pub use in_memory::InMemoryStockRepository;
pub use locks::{LockTimeout, ProductLockGuard, ProductLockRegistry};
pub use repository::{StockRepository, StorageError};
