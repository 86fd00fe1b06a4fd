use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salonstock_core::{ProductId, Volume};
use salonstock_events::Event;
use salonstock_inventory::StockStatus;

/// Event: StockAlertRaised. A product's status moved downward (toward empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlertRaised {
    pub product_id: ProductId,
    pub previous: StockStatus,
    pub current: StockStatus,
    pub total_available: Volume,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockAlertResolved. A product's status moved back upward, usually
/// after a restock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlertResolved {
    pub product_id: ProductId,
    pub previous: StockStatus,
    pub current: StockStatus,
    pub total_available: Volume,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockAlert {
    Raised(StockAlertRaised),
    Resolved(StockAlertResolved),
}

impl StockAlert {
    pub fn product_id(&self) -> ProductId {
        match self {
            StockAlert::Raised(e) => e.product_id,
            StockAlert::Resolved(e) => e.product_id,
        }
    }

    pub fn current_status(&self) -> StockStatus {
        match self {
            StockAlert::Raised(e) => e.current,
            StockAlert::Resolved(e) => e.current,
        }
    }
}

impl Event for StockAlert {
    fn event_type(&self) -> &'static str {
        match self {
            StockAlert::Raised(_) => "stock.alert.raised",
            StockAlert::Resolved(_) => "stock.alert.resolved",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockAlert::Raised(e) => e.occurred_at,
            StockAlert::Resolved(e) => e.occurred_at,
        }
    }
}
