//! Error types for compact list operations.

use std::error::Error;
use std::fmt;

use clist_alloc::AllocError;

/// Errors from [`CompactList`](crate::CompactList) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListError {
    /// `insert` past the end or `remove` at/after the end.
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The list length at the time of the call.
        len: usize,
    },
    /// `change_capacity` would drop live elements.
    CapacityBelowLength {
        /// Capacity asked for.
        requested: usize,
        /// Current length.
        len: usize,
    },
    /// `change_capacity` below the configured floor.
    CapacityBelowMinimum {
        /// Capacity asked for.
        requested: usize,
        /// The configured minimum capacity.
        min: usize,
    },
    /// A [`ListConfig`](crate::ListConfig) failed validation.
    InvalidConfig {
        /// Which constraint was violated.
        reason: String,
    },
    /// The allocator could not satisfy a capacity change.
    Alloc(AllocError),
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::CapacityBelowLength { requested, len } => {
                write!(f, "capacity {requested} is below length {len}")
            }
            Self::CapacityBelowMinimum { requested, min } => {
                write!(f, "capacity {requested} is below minimum capacity {min}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid list config: {reason}"),
            Self::Alloc(e) => write!(f, "allocation failed: {e}"),
        }
    }
}

impl Error for ListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocError> for ListError {
    fn from(e: AllocError) -> Self {
        Self::Alloc(e)
    }
}
