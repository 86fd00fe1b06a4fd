//! Fixed-point product volumes.
//!
//! All stock arithmetic runs on [`Volume`]: an unsigned count of **tenths of
//! a millilitre**. Integer fixed-point keeps conservation exact across long
//! sequences of small consumptions, where binary floating point would
//! accumulate drift.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Fixed-point sub-unit: tenths of a millilitre per millilitre.
const TENTHS_PER_ML: u64 = 10;

/// A non-negative volume of product, in tenths of a millilitre.
///
/// Serialized transparently as the raw tenth-ml integer. The representable
/// range (u64 tenths, ~1.8e17 ml) is far beyond any real stock level, so
/// construction from whole millilitres does not bother with overflow checks;
/// arithmetic that combines volumes does.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Volume(u64);

impl Volume {
    pub const ZERO: Volume = Volume(0);

    /// Volume from whole millilitres.
    pub const fn from_ml(ml: u64) -> Self {
        Self(ml * TENTHS_PER_ML)
    }

    /// Volume from tenths of a millilitre (the raw fixed-point unit).
    pub const fn from_tenths_ml(tenths: u64) -> Self {
        Self(tenths)
    }

    /// Raw fixed-point value (tenths of a millilitre).
    pub const fn as_tenths_ml(self) -> u64 {
        self.0
    }

    /// Whole-millilitre part, truncated.
    pub const fn whole_ml(self) -> u64 {
        self.0 / TENTHS_PER_ML
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Total volume of `count` containers of this capacity.
    pub fn checked_mul_count(self, count: u32) -> Option<Self> {
        self.0.checked_mul(u64::from(count)).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl ValueObject for Volume {}

impl core::ops::Add for Volume {
    type Output = Volume;

    fn add(self, rhs: Volume) -> Volume {
        Volume(self.0 + rhs.0)
    }
}

impl core::ops::Sub for Volume {
    type Output = Volume;

    fn sub(self, rhs: Volume) -> Volume {
        Volume(self.0 - rhs.0)
    }
}

impl core::iter::Sum for Volume {
    fn sum<I: Iterator<Item = Volume>>(iter: I) -> Volume {
        iter.fold(Volume::ZERO, |acc, v| acc + v)
    }
}

impl core::fmt::Display for Volume {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let ml = self.0 / TENTHS_PER_ML;
        let tenth = self.0 % TENTHS_PER_ML;
        if tenth == 0 {
            write!(f, "{ml}ml")
        } else {
            write!(f, "{ml}.{tenth}ml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ml_scales_to_tenths() {
        assert_eq!(Volume::from_ml(500).as_tenths_ml(), 5000);
        assert_eq!(Volume::from_tenths_ml(5).whole_ml(), 0);
        assert_eq!(Volume::from_tenths_ml(15).whole_ml(), 1);
    }

    #[test]
    fn display_drops_zero_fraction() {
        assert_eq!(Volume::from_ml(500).to_string(), "500ml");
        assert_eq!(Volume::from_tenths_ml(5005).to_string(), "500.5ml");
        assert_eq!(Volume::ZERO.to_string(), "0ml");
    }

    #[test]
    fn checked_sub_refuses_underflow() {
        let a = Volume::from_ml(10);
        let b = Volume::from_ml(25);
        assert_eq!(a.checked_sub(b), None);
        assert_eq!(b.checked_sub(a), Some(Volume::from_ml(15)));
    }

    #[test]
    fn serializes_as_the_raw_tenths_integer() {
        let volume = Volume::from_tenths_ml(5005);
        assert_eq!(serde_json::to_string(&volume).unwrap(), "5005");
        assert_eq!(serde_json::from_str::<Volume>("5005").unwrap(), volume);
    }

    #[test]
    fn checked_mul_count_refuses_overflow() {
        assert_eq!(Volume::from_ml(1000).checked_mul_count(3), Some(Volume::from_ml(3000)));
        assert_eq!(Volume::from_tenths_ml(u64::MAX).checked_mul_count(2), None);
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

            /// Property: min-then-subtract never underflows.
            #[test]
            fn draw_is_total(a in 0u64..1_000_000, b in 0u64..1_000_000) {
                let pool = Volume::from_tenths_ml(a);
                let want = Volume::from_tenths_ml(b);
                let drawn = want.min(pool);
                prop_assert!(pool.checked_sub(drawn).is_some());
                prop_assert!(want.checked_sub(drawn).is_some());
            }

            /// Property: add/sub round-trips exactly.
            #[test]
            fn add_sub_roundtrip(a in 0u64..u64::MAX / 2, b in 0u64..u64::MAX / 2) {
                let a = Volume::from_tenths_ml(a);
                let b = Volume::from_tenths_ml(b);
                prop_assert_eq!((a + b) - b, a);
            }
        }
    }
}
