//! Allocator configuration parameters.

use crate::error::AllocError;

/// What the checked allocator does when the backend cannot satisfy a
/// non-zero request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the failure to the caller as an [`AllocError`].
    #[default]
    Propagate,
    /// Print a diagnostic to stderr and abort the process. The failing
    /// call never returns.
    Abort,
}

/// Configuration for the checked allocator.
///
/// Validated at construction of [`Checked`](crate::Checked); immutable
/// afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocConfig {
    /// Failure handling for non-zero requests.
    ///
    /// Default: [`FailurePolicy::Propagate`].
    pub policy: FailurePolicy,

    /// Alignment used by the size-only entry points (`allocate`,
    /// `zero_allocate`).
    ///
    /// Default: two machine words, the alignment `malloc` guarantees.
    /// Must be a power of two.
    pub default_align: usize,
}

impl AllocConfig {
    /// Default alignment for size-only requests.
    pub const DEFAULT_ALIGN: usize = 2 * std::mem::size_of::<usize>();

    /// Create a config with the given failure policy and default alignment.
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            default_align: Self::DEFAULT_ALIGN,
        }
    }

    /// Config that aborts the process on allocation failure.
    pub fn aborting() -> Self {
        Self::new(FailurePolicy::Abort)
    }

    /// Check that the configured alignment is usable.
    pub fn validate(&self) -> Result<(), AllocError> {
        if !self.default_align.is_power_of_two() {
            return Err(AllocError::InvalidLayout {
                size: 0,
                align: self.default_align,
            });
        }
        Ok(())
    }
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self::new(FailurePolicy::Propagate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_propagates_with_malloc_alignment() {
        let config = AllocConfig::default();
        assert_eq!(config.policy, FailurePolicy::Propagate);
        assert_eq!(config.default_align, 2 * std::mem::size_of::<usize>());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn aborting_keeps_default_alignment() {
        let config = AllocConfig::aborting();
        assert_eq!(config.policy, FailurePolicy::Abort);
        assert_eq!(config.default_align, AllocConfig::DEFAULT_ALIGN);
    }

    #[test]
    fn non_power_of_two_alignment_rejected() {
        let config = AllocConfig {
            default_align: 12,
            ..AllocConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AllocError::InvalidLayout { align: 12, .. })
        ));
    }
}
