//! Per-product commit locks.
//!
//! Two sales may race to consume the same product; commit-phase mutation is
//! serialized per product id. A sale acquires its whole product set in one
//! registry operation (all free or keep waiting), which makes lock ordering
//! irrelevant and rules out deadlock between multi-product sales. Waiting is
//! bounded: a sale that cannot get its locks in time fails with a retryable
//! timeout instead of hanging the till.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;

use salonstock_core::ProductId;

/// Lock acquisition gave up before the product set came free.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("product locks not acquired within {waited:?}")]
pub struct LockTimeout {
    pub waited: Duration,
}

/// Registry of products currently locked for commit.
#[derive(Debug, Default)]
pub struct ProductLockRegistry {
    held: Mutex<HashSet<ProductId>>,
    released: Condvar,
}

impl ProductLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire every product in `products` or none, waiting up to `timeout`.
    ///
    /// The guard releases the whole set on drop. Duplicate ids in the input
    /// are tolerated.
    pub fn acquire(
        &self,
        products: &[ProductId],
        timeout: Duration,
    ) -> Result<ProductLockGuard<'_>, LockTimeout> {
        let wanted: HashSet<ProductId> = products.iter().copied().collect();
        let started = Instant::now();

        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if held.is_disjoint(&wanted) {
                held.extend(wanted.iter().copied());
                return Ok(ProductLockGuard {
                    registry: self,
                    products: wanted.into_iter().collect(),
                });
            }

            let elapsed = started.elapsed();
            let Some(remaining) = timeout.checked_sub(elapsed) else {
                return Err(LockTimeout { waited: elapsed });
            };

            let (guard, wait) = self
                .released
                .wait_timeout(held, remaining)
                .unwrap_or_else(|e| e.into_inner());
            held = guard;
            if wait.timed_out() && !held.is_disjoint(&wanted) {
                return Err(LockTimeout {
                    waited: started.elapsed(),
                });
            }
        }
    }

    fn release(&self, products: &[ProductId]) {
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        for product in products {
            held.remove(product);
        }
        self.released.notify_all();
    }
}

/// RAII guard over one sale's product set.
#[derive(Debug)]
pub struct ProductLockGuard<'a> {
    registry: &'a ProductLockRegistry,
    products: Vec<ProductId>,
}

impl Drop for ProductLockGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.products);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn disjoint_sets_lock_concurrently() {
        let registry = ProductLockRegistry::new();
        let a = ProductId::new();
        let b = ProductId::new();

        let guard_a = registry.acquire(&[a], Duration::from_millis(10)).unwrap();
        let guard_b = registry.acquire(&[b], Duration::from_millis(10)).unwrap();
        drop(guard_a);
        drop(guard_b);
    }

    #[test]
    fn overlapping_set_times_out_while_held() {
        let registry = ProductLockRegistry::new();
        let a = ProductId::new();
        let b = ProductId::new();

        let _guard = registry.acquire(&[a, b], Duration::from_millis(10)).unwrap();
        let err = registry.acquire(&[b], Duration::from_millis(20)).unwrap_err();
        assert!(err.waited >= Duration::from_millis(20));
    }

    #[test]
    fn release_wakes_a_waiter() {
        let registry = Arc::new(ProductLockRegistry::new());
        let product = ProductId::new();

        let guard = registry.acquire(&[product], Duration::from_millis(10)).unwrap();

        let waiter = {
            let registry = registry.clone();
            thread::spawn(move || {
                registry
                    .acquire(&[product], Duration::from_secs(5))
                    .map(|g| drop(g))
                    .is_ok()
            })
        };

        thread::sleep(Duration::from_millis(20));
        drop(guard);

        assert!(waiter.join().unwrap());
    }

    #[test]
    fn duplicate_ids_are_tolerated() {
        let registry = ProductLockRegistry::new();
        let product = ProductId::new();

        let guard = registry
            .acquire(&[product, product], Duration::from_millis(10))
            .unwrap();
        drop(guard);

        // Released exactly once; re-acquirable.
        let _again = registry.acquire(&[product], Duration::from_millis(10)).unwrap();
    }
}
