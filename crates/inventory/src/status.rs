use serde::{Deserialize, Serialize};

use salonstock_core::Volume;

/// Derived stock classification. Never stored; recomputed from the current
/// total available volume and the per-product threshold on every read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Good,
    Low,
    Critical,
    Out,
}

impl StockStatus {
    /// Severity rank; higher is worse. A transition is "downward" when the
    /// rank strictly increases.
    pub fn severity(self) -> u8 {
        match self {
            StockStatus::Good => 0,
            StockStatus::Low => 1,
            StockStatus::Critical => 2,
            StockStatus::Out => 3,
        }
    }

    pub fn is_worse_than(self, other: StockStatus) -> bool {
        self.severity() > other.severity()
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            StockStatus::Good => "good",
            StockStatus::Low => "low",
            StockStatus::Critical => "critical",
            StockStatus::Out => "out",
        };
        f.write_str(s)
    }
}

/// Deployment-tunable classification policy.
///
/// The low threshold is always the per-product `min_stock_threshold`; the
/// policy only decides where the critical band starts inside it, as a
/// percentage of the threshold. Deployments that do not distinguish a
/// critical tier set the percentage to zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    /// Critical when `total <= threshold * critical_percent / 100`.
    pub critical_percent: u8,
}

impl ThresholdPolicy {
    pub const fn new(critical_percent: u8) -> Self {
        Self { critical_percent }
    }

    fn critical_band(&self, threshold: Volume) -> Volume {
        let pct = u128::from(self.critical_percent.min(100));
        // Widen to avoid overflow near the top of the fixed-point range.
        let band = u128::from(threshold.as_tenths_ml()) * pct / 100;
        Volume::from_tenths_ml(band as u64)
    }
}

impl Default for ThresholdPolicy {
    /// Critical at half the per-product threshold.
    fn default() -> Self {
        Self::new(50)
    }
}

/// Classify under the default policy. Pure and deterministic.
pub fn classify(total_available: Volume, min_stock_threshold: Volume) -> StockStatus {
    classify_with(total_available, min_stock_threshold, &ThresholdPolicy::default())
}

/// Classify under an explicit policy. Pure and deterministic.
///
/// `Out` iff nothing is left; `Critical` inside the policy's band;
/// `Low` at or below the per-product threshold; otherwise `Good`.
pub fn classify_with(
    total_available: Volume,
    min_stock_threshold: Volume,
    policy: &ThresholdPolicy,
) -> StockStatus {
    if total_available.is_zero() {
        return StockStatus::Out;
    }
    if total_available <= policy.critical_band(min_stock_threshold) {
        return StockStatus::Critical;
    }
    if total_available <= min_stock_threshold {
        return StockStatus::Low;
    }
    StockStatus::Good
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_is_out_regardless_of_threshold() {
        assert_eq!(classify(Volume::ZERO, Volume::ZERO), StockStatus::Out);
        assert_eq!(classify(Volume::ZERO, Volume::from_ml(100)), StockStatus::Out);
    }

    #[test]
    fn below_threshold_is_low_and_below_half_is_critical() {
        let threshold = Volume::from_ml(100);
        assert_eq!(classify(Volume::from_ml(100), threshold), StockStatus::Low);
        assert_eq!(classify(Volume::from_ml(51), threshold), StockStatus::Low);
        assert_eq!(classify(Volume::from_ml(50), threshold), StockStatus::Critical);
        assert_eq!(classify(Volume::from_ml(1), threshold), StockStatus::Critical);
        assert_eq!(classify(Volume::from_ml(101), threshold), StockStatus::Good);
    }

    #[test]
    fn zero_critical_percent_disables_the_critical_tier() {
        let policy = ThresholdPolicy::new(0);
        let threshold = Volume::from_ml(100);
        assert_eq!(
            classify_with(Volume::from_ml(1), threshold, &policy),
            StockStatus::Low
        );
        assert_eq!(classify_with(Volume::ZERO, threshold, &policy), StockStatus::Out);
    }

    #[test]
    fn zero_threshold_never_flags_low() {
        assert_eq!(classify(Volume::from_tenths_ml(1), Volume::ZERO), StockStatus::Good);
    }

    #[test]
    fn severity_orders_downward_transitions() {
        assert!(StockStatus::Low.is_worse_than(StockStatus::Good));
        assert!(StockStatus::Out.is_worse_than(StockStatus::Critical));
        assert!(!StockStatus::Good.is_worse_than(StockStatus::Good));
        assert!(!StockStatus::Good.is_worse_than(StockStatus::Out));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: classification is a pure function of its inputs.
            #[test]
            fn classify_is_idempotent(total in 0u64..10_000_000, threshold in 0u64..10_000_000) {
                let total = Volume::from_tenths_ml(total);
                let threshold = Volume::from_tenths_ml(threshold);
                let first = classify(total, threshold);
                let second = classify(total, threshold);
                prop_assert_eq!(first, second);
            }

            /// Property: exactly one status per input, ordered by volume.
            #[test]
            fn statuses_partition_the_volume_axis(
                total in 0u64..10_000_000,
                threshold in 1u64..10_000_000,
            ) {
                let status = classify(
                    Volume::from_tenths_ml(total),
                    Volume::from_tenths_ml(threshold),
                );
                match status {
                    StockStatus::Out => prop_assert_eq!(total, 0),
                    StockStatus::Critical => prop_assert!(total > 0 && total <= threshold),
                    StockStatus::Low => prop_assert!(total > 0 && total <= threshold),
                    StockStatus::Good => prop_assert!(total > threshold),
                }
            }
        }
    }
}
