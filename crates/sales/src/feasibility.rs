//! Dry-run feasibility check for a sale against a stock snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use salonstock_core::{ProductId, Volume};
use salonstock_inventory::StockRecord;

/// One product the sale cannot be satisfied from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub product_id: ProductId,
    pub required: Volume,
    pub available: Volume,
}

impl core::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "product {}: requires {}, only {} available",
            self.product_id, self.required, self.available
        )
    }
}

/// Check combined requirements against snapshot records, without mutating
/// anything.
///
/// Returns every shortfall, in product-id order, so the caller can render a
/// complete actionable message rather than failing on the first product.
/// An empty result means the sale is fully satisfiable. Products missing
/// from the snapshot are reported as shortfalls with zero available.
pub fn check_feasibility(
    requirements: &BTreeMap<ProductId, Volume>,
    snapshot: &BTreeMap<ProductId, StockRecord>,
) -> Vec<Shortfall> {
    let mut shortfalls = Vec::new();
    for (&product_id, &required) in requirements {
        let available = snapshot
            .get(&product_id)
            .map(|r| r.total_available())
            .unwrap_or(Volume::ZERO);
        if required > available {
            shortfalls.push(Shortfall {
                product_id,
                required,
                available,
            });
        }
    }
    shortfalls
}
