//! Consumption engine: draw a requested volume out of a stock record.
//!
//! The engine drains the open container first, then opens sealed containers
//! one at a time until the request is satisfied or the product runs dry.
//! Running dry is a modeled outcome (a shortfall in the result), not an
//! error: a checkout coordinator decides whether partial satisfaction is
//! acceptable, the engine just reports the arithmetic truth.

use serde::{Deserialize, Serialize};

use salonstock_core::{DomainError, DomainResult, ProductId, SaleId, ServiceId, Volume};

use crate::record::StockRecord;

/// Which sale line triggered a consumption. Audit-only; the arithmetic never
/// looks at it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginContext {
    pub sale_id: Option<SaleId>,
    pub service_id: Option<ServiceId>,
}

impl OriginContext {
    pub fn sale_line(sale_id: SaleId, service_id: ServiceId) -> Self {
        Self {
            sale_id: Some(sale_id),
            service_id: Some(service_id),
        }
    }
}

/// A request to draw `requested` of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionRequest {
    pub product_id: ProductId,
    pub requested: Volume,
    pub origin: OriginContext,
}

/// Outcome of one consumption against one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionResult {
    /// Volume actually drawn; equals the request when fully satisfied.
    pub consumed: Volume,
    /// Sealed containers converted to open during this single request.
    pub containers_opened: u32,
    /// `requested - consumed`; zero on full satisfaction.
    pub shortfall: Volume,
    /// The record after the draw.
    pub record: StockRecord,
}

impl ConsumptionResult {
    pub fn fully_satisfied(&self) -> bool {
        self.shortfall.is_zero()
    }

    fn no_op(record: &StockRecord) -> Self {
        Self {
            consumed: Volume::ZERO,
            containers_opened: 0,
            shortfall: Volume::ZERO,
            record: record.clone(),
        }
    }
}

/// Draw `requested` from `record`.
///
/// Pure: the input record is untouched, the result carries the new one.
/// A zero request is a no-op result; callers reject empty requests upstream
/// as validation, the engine does not second-guess them. A record whose
/// capacity is zero cannot be drawn from and fails fast as a configuration
/// error; it would otherwise loop forever opening empty containers.
pub fn consume(record: &StockRecord, requested: Volume) -> DomainResult<ConsumptionResult> {
    if record.container_capacity().is_zero() {
        // `StockRecord` construction rejects this, but records arrive from
        // storage; never trust the row.
        return Err(DomainError::configuration(format!(
            "product {}: container capacity must be positive",
            record.product_id()
        )));
    }

    if requested.is_zero() {
        return Ok(ConsumptionResult::no_op(record));
    }

    let capacity = record.container_capacity();
    let mut sealed = record.sealed_containers();
    let mut open = record.open_remaining();
    let mut remaining = requested;
    let mut containers_opened = 0u32;

    loop {
        let drawn = remaining.min(open);
        open = open - drawn;
        remaining = remaining - drawn;

        if remaining.is_zero() || sealed == 0 {
            break;
        }

        sealed -= 1;
        open = capacity;
        containers_opened += 1;
    }

    let consumed = requested - remaining;

    Ok(ConsumptionResult {
        consumed,
        containers_opened,
        shortfall: remaining,
        record: record.with_stock(sealed, open),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sealed: u32, capacity_ml: u64, open_ml: u64) -> StockRecord {
        StockRecord::from_parts(
            ProductId::new(),
            sealed,
            Volume::from_ml(capacity_ml),
            Volume::from_ml(open_ml),
            Volume::from_ml(100),
        )
        .unwrap()
    }

    #[test]
    fn draws_open_container_first() {
        let result = consume(&record(1, 1000, 300), Volume::from_ml(200)).unwrap();
        assert_eq!(result.consumed, Volume::from_ml(200));
        assert_eq!(result.containers_opened, 0);
        assert_eq!(result.record.sealed_containers(), 1);
        assert_eq!(result.record.open_remaining(), Volume::from_ml(100));
    }

    #[test]
    fn opens_sealed_containers_as_needed() {
        // Two sealed 1000ml bottles, nothing open; a 1500ml draw opens both.
        let result = consume(&record(2, 1000, 0), Volume::from_ml(1500)).unwrap();
        assert_eq!(result.consumed, Volume::from_ml(1500));
        assert_eq!(result.containers_opened, 2);
        assert_eq!(result.shortfall, Volume::ZERO);
        assert_eq!(result.record.sealed_containers(), 0);
        assert_eq!(result.record.open_remaining(), Volume::from_ml(500));
    }

    #[test]
    fn draining_the_last_drop_leaves_exact_zero() {
        let result = consume(&record(0, 1000, 50), Volume::from_ml(50)).unwrap();
        assert_eq!(result.consumed, Volume::from_ml(50));
        assert_eq!(result.containers_opened, 0);
        assert_eq!(result.record.sealed_containers(), 0);
        assert_eq!(result.record.open_remaining(), Volume::ZERO);
        assert!(result.record.total_available().is_zero());
    }

    #[test]
    fn shortfall_reports_the_unmet_remainder() {
        let result = consume(&record(1, 500, 0), Volume::from_ml(600)).unwrap();
        assert!(!result.fully_satisfied());
        assert_eq!(result.consumed, Volume::from_ml(500));
        assert_eq!(result.shortfall, Volume::from_ml(100));
        assert_eq!(result.containers_opened, 1);
        assert!(result.record.total_available().is_zero());
    }

    #[test]
    fn zero_request_is_a_no_op() {
        let before = record(2, 1000, 400);
        let result = consume(&before, Volume::ZERO).unwrap();
        assert_eq!(result.record, before);
        assert_eq!(result.consumed, Volume::ZERO);
        assert_eq!(result.containers_opened, 0);
    }

    #[test]
    fn consuming_exact_total_exhausts_the_record() {
        let before = record(3, 750, 200);
        let total = before.total_available();
        let result = consume(&before, total).unwrap();
        assert_eq!(result.consumed, total);
        assert_eq!(result.record.sealed_containers(), 0);
        assert_eq!(result.record.open_remaining(), Volume::ZERO);
    }

    #[test]
    fn consuming_from_an_empty_record_is_all_shortfall() {
        let result = consume(&record(0, 1000, 0), Volume::from_ml(10)).unwrap();
        assert_eq!(result.consumed, Volume::ZERO);
        assert_eq!(result.shortfall, Volume::from_ml(10));
        assert_eq!(result.containers_opened, 0);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_record() -> impl Strategy<Value = StockRecord> {
            (0u32..50, 1u64..20_000, 0u64..10_000).prop_filter_map(
                "open must stay below capacity",
                |(sealed, capacity, open)| {
                    StockRecord::from_parts(
                        ProductId::new(),
                        sealed,
                        Volume::from_tenths_ml(capacity),
                        Volume::from_tenths_ml(open.min(capacity.saturating_sub(1))),
                        Volume::from_tenths_ml(1_000),
                    )
                    .ok()
                },
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: volume is conserved, before = after + consumed.
            #[test]
            fn conservation(record in arb_record(), requested in 0u64..2_000_000) {
                let before = record.total_available();
                let result = consume(&record, Volume::from_tenths_ml(requested)).unwrap();
                let after = result.record.total_available();
                prop_assert_eq!(before, after + result.consumed);
            }

            /// Property: consumed + shortfall always equals the request.
            #[test]
            fn request_is_accounted_for(record in arb_record(), requested in 0u64..2_000_000) {
                let result = consume(&record, Volume::from_tenths_ml(requested)).unwrap();
                prop_assert_eq!(result.consumed + result.shortfall, Volume::from_tenths_ml(requested));
            }

            /// Property: no negative residue; the open remainder stays below
            /// capacity and the sealed count never wraps.
            #[test]
            fn no_negative_residue(record in arb_record(), requested in 0u64..2_000_000) {
                let result = consume(&record, Volume::from_tenths_ml(requested)).unwrap();
                prop_assert!(result.record.open_remaining() < result.record.container_capacity());
                prop_assert!(result.record.sealed_containers() <= record.sealed_containers());
            }

            /// Property: consuming exactly the total leaves exact zero.
            #[test]
            fn exact_exhaustion(record in arb_record()) {
                let result = consume(&record, record.total_available()).unwrap();
                prop_assert_eq!(result.record.sealed_containers(), 0);
                prop_assert!(result.record.open_remaining().is_zero());
                prop_assert!(result.shortfall.is_zero());
            }

            /// Property: the engine is deterministic.
            #[test]
            fn consume_is_deterministic(record in arb_record(), requested in 0u64..2_000_000) {
                let first = consume(&record, Volume::from_tenths_ml(requested)).unwrap();
                let second = consume(&record, Volume::from_tenths_ml(requested)).unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }
}
