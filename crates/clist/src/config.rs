//! Growth and shrink policy for compact lists.

use crate::error::ListError;

/// Capacity policy for a [`CompactList`](crate::CompactList).
///
/// Validated when a list is built with
/// [`CompactList::with_config`](crate::CompactList::with_config);
/// immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ListConfig {
    /// Multiplier applied to `capacity + 1` when a full list grows.
    ///
    /// Default: 1.5. Must be finite and at least 1.0 so that growth always
    /// gains at least one slot.
    pub growth_factor: f64,

    /// A list shrinks once `len < shrink_factor * capacity`.
    ///
    /// Default: 0.5. Must be in `(0, 1]`.
    pub shrink_factor: f64,

    /// Slots allocated by the first `initialize`.
    ///
    /// Default: 3. Must be at least `min_capacity`.
    pub default_capacity: usize,

    /// Floor below which a list never shrinks.
    ///
    /// Default: 1. Must be non-zero.
    pub min_capacity: usize,
}

impl ListConfig {
    /// Default growth multiplier.
    pub const GROWTH_FACTOR: f64 = 1.5;

    /// Default shrink threshold.
    pub const SHRINK_FACTOR: f64 = 0.5;

    /// Default initial capacity.
    pub const DEFAULT_CAPACITY: usize = 3;

    /// Default capacity floor.
    pub const MIN_CAPACITY: usize = 1;

    /// Check every constraint documented on the fields.
    pub fn validate(&self) -> Result<(), ListError> {
        if !self.growth_factor.is_finite() || self.growth_factor < 1.0 {
            return Err(invalid(format!(
                "growth_factor {} must be finite and >= 1.0",
                self.growth_factor
            )));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor <= 1.0) {
            return Err(invalid(format!(
                "shrink_factor {} must be in (0, 1]",
                self.shrink_factor
            )));
        }
        if self.min_capacity == 0 {
            return Err(invalid("min_capacity must be non-zero".into()));
        }
        if self.default_capacity < self.min_capacity {
            return Err(invalid(format!(
                "default_capacity {} is below min_capacity {}",
                self.default_capacity, self.min_capacity
            )));
        }
        Ok(())
    }

    /// Capacity after growing a full list of `capacity` slots:
    /// `floor(growth_factor * (capacity + 1))`.
    ///
    /// Returns `None` if the result does not fit in `usize`.
    pub fn grown_capacity(&self, capacity: usize) -> Option<usize> {
        let next = capacity.checked_add(1)?;
        let grown = (self.growth_factor * next as f64).floor();
        if grown >= usize::MAX as f64 {
            return None;
        }
        // A factor of exactly 1.0 still yields `next`; rounding in the
        // float product must never give back fewer slots than that.
        Some((grown as usize).max(next))
    }

    /// Whether a list at `len`/`capacity` should shrink to `len` slots.
    ///
    /// Strict comparison: a list sitting exactly on the threshold keeps
    /// its capacity.
    pub fn should_shrink(&self, len: usize, capacity: usize) -> bool {
        (len as f64) < self.shrink_factor * capacity as f64 && len > self.min_capacity
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            growth_factor: Self::GROWTH_FACTOR,
            shrink_factor: Self::SHRINK_FACTOR,
            default_capacity: Self::DEFAULT_CAPACITY,
            min_capacity: Self::MIN_CAPACITY,
        }
    }
}

fn invalid(reason: String) -> ListError {
    ListError::InvalidConfig { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = ListConfig::default();
        assert_eq!(config.default_capacity, 3);
        assert_eq!(config.min_capacity, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn growth_sequence_from_default_capacity() {
        let config = ListConfig::default();
        let mut cap = config.default_capacity;
        let mut seen = vec![cap];
        for _ in 0..5 {
            cap = config.grown_capacity(cap).unwrap();
            seen.push(cap);
        }
        // floor(1.5 * (c + 1)): 3 -> 6 -> 10 -> 16 -> 25 -> 39
        assert_eq!(seen, vec![3, 6, 10, 16, 25, 39]);
    }

    #[test]
    fn growth_from_one_gains_a_slot() {
        let config = ListConfig::default();
        assert_eq!(config.grown_capacity(1), Some(3));
        assert_eq!(config.grown_capacity(0), Some(1));
    }

    #[test]
    fn unit_growth_factor_adds_one() {
        let config = ListConfig {
            growth_factor: 1.0,
            ..ListConfig::default()
        };
        assert_eq!(config.grown_capacity(7), Some(8));
    }

    #[test]
    fn growth_overflow_is_none() {
        let config = ListConfig::default();
        assert_eq!(config.grown_capacity(usize::MAX), None);
        assert_eq!(config.grown_capacity(usize::MAX - 10), None);
    }

    #[test]
    fn shrink_threshold_is_strict() {
        let config = ListConfig::default();
        // 3 < 0.5 * 6 is false.
        assert!(!config.should_shrink(3, 6));
        assert!(config.should_shrink(2, 6));
    }

    #[test]
    fn never_shrinks_at_or_below_min_capacity() {
        let config = ListConfig::default();
        assert!(!config.should_shrink(1, 10));
        assert!(!config.should_shrink(0, 10));
        assert!(!config.should_shrink(0, 1));
    }

    #[test]
    fn odd_capacity_threshold() {
        let config = ListConfig::default();
        // 0.5 * 5 = 2.5: len 2 shrinks, len 3 does not.
        assert!(config.should_shrink(2, 5));
        assert!(!config.should_shrink(3, 5));
    }

    #[test]
    fn rejects_bad_factors() {
        for growth_factor in [0.5, f64::NAN, f64::INFINITY] {
            let config = ListConfig {
                growth_factor,
                ..ListConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ListError::InvalidConfig { .. })
            ));
        }
        for shrink_factor in [0.0, -0.5, 1.5, f64::NAN] {
            let config = ListConfig {
                shrink_factor,
                ..ListConfig::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn rejects_bad_capacities() {
        let zero_min = ListConfig {
            min_capacity: 0,
            ..ListConfig::default()
        };
        assert!(zero_min.validate().is_err());

        let default_below_min = ListConfig {
            default_capacity: 2,
            min_capacity: 4,
            ..ListConfig::default()
        };
        assert!(default_below_min.validate().is_err());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn growth_always_makes_room(cap in 0usize..1_000_000, factor in 1.0f64..4.0) {
                let config = ListConfig {
                    growth_factor: factor,
                    ..ListConfig::default()
                };
                let grown = config.grown_capacity(cap).unwrap();
                prop_assert!(grown > cap);
            }

            #[test]
            fn shrink_target_respects_floor(len in 0usize..1000, cap in 1usize..2000) {
                let config = ListConfig::default();
                if config.should_shrink(len, cap) {
                    prop_assert!(len >= config.min_capacity);
                    prop_assert!(len < cap);
                }
            }
        }
    }
}
