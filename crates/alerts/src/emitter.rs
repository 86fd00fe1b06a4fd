//! Alert emitter: publishes stock alerts on status transitions, exactly once
//! per product+status.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use salonstock_core::{ProductId, Volume};
use salonstock_events::EventBus;
use salonstock_inventory::StockStatus;

use crate::alert::{StockAlert, StockAlertRaised, StockAlertResolved};

/// Deduplicating alert emitter.
///
/// Fires [`StockAlert::Raised`] only on downward transitions (toward empty)
/// so dashboards re-reading an unchanged record never cause alert storms,
/// and optionally fires [`StockAlert::Resolved`] when a restock moves a
/// product back up. Idempotent per product+status: the last emitted status
/// is tracked per product and an unchanged status never re-fires.
pub struct AlertEmitter<B> {
    bus: B,
    last_seen: RwLock<HashMap<ProductId, StockStatus>>,
    emit_resolved: bool,
}

impl<B> AlertEmitter<B>
where
    B: EventBus<StockAlert>,
{
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            last_seen: RwLock::new(HashMap::new()),
            emit_resolved: true,
        }
    }

    /// Disable resolved events; only downward alerts will be published.
    pub fn without_resolved(mut self) -> Self {
        self.emit_resolved = false;
        self
    }

    /// Observe a status transition for one product.
    ///
    /// `previous` is the status computed before the mutation that triggered
    /// this call; it seeds the dedupe state the first time a product is
    /// seen. Returns the alert that was published, if any.
    pub fn observe(
        &self,
        product_id: ProductId,
        previous: StockStatus,
        current: StockStatus,
        total_available: Volume,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<StockAlert>, B::Error> {
        let baseline = {
            let mut last = self.last_seen.write().unwrap_or_else(|e| e.into_inner());
            let baseline = *last.entry(product_id).or_insert(previous);
            // Track the latest status even when no event fires, so a later
            // transition compares against reality.
            last.insert(product_id, current);
            baseline
        };

        if current == baseline {
            return Ok(None);
        }

        let alert = if current.is_worse_than(baseline) {
            tracing::warn!(
                product_id = %product_id,
                previous = %baseline,
                current = %current,
                total_available = %total_available,
                "stock alert raised"
            );
            StockAlert::Raised(StockAlertRaised {
                product_id,
                previous: baseline,
                current,
                total_available,
                occurred_at,
            })
        } else if self.emit_resolved {
            tracing::info!(
                product_id = %product_id,
                previous = %baseline,
                current = %current,
                total_available = %total_available,
                "stock alert resolved"
            );
            StockAlert::Resolved(StockAlertResolved {
                product_id,
                previous: baseline,
                current,
                total_available,
                occurred_at,
            })
        } else {
            return Ok(None);
        };

        self.bus.publish(alert.clone())?;
        Ok(Some(alert))
    }
}
