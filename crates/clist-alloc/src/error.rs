//! Allocation error types.

use std::error::Error;
use std::fmt;

use crate::block::Block;

/// Errors reported by [`Checked`](crate::Checked) under
/// [`FailurePolicy::Propagate`](crate::FailurePolicy::Propagate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The backend returned null for a non-zero request.
    OutOfMemory {
        /// Number of bytes requested.
        size: usize,
        /// Alignment requested.
        align: usize,
    },
    /// `elem_size * count` does not fit in `usize`.
    SizeOverflow {
        /// Size of one element in bytes.
        elem_size: usize,
        /// Number of elements requested.
        count: usize,
    },
    /// The size/alignment pair is not a valid `Layout` (alignment not a
    /// power of two, or size exceeds `isize::MAX` once rounded up).
    InvalidLayout {
        /// Number of bytes requested.
        size: usize,
        /// Alignment requested.
        align: usize,
    },
    /// A copy asked for more bytes than the source block holds.
    CopyOverrun {
        /// Number of bytes the caller asked to copy.
        requested: usize,
        /// Size of the source block.
        available: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { size, align } => {
                write!(
                    f,
                    "could not allocate required memory: {size} bytes (align {align})"
                )
            }
            Self::SizeOverflow { elem_size, count } => {
                write!(
                    f,
                    "allocation size overflow: {count} elements of {elem_size} bytes"
                )
            }
            Self::InvalidLayout { size, align } => {
                write!(f, "invalid layout: {size} bytes with align {align}")
            }
            Self::CopyOverrun {
                requested,
                available,
            } => {
                write!(
                    f,
                    "copy overrun: requested {requested} bytes from a {available}-byte block"
                )
            }
        }
    }
}

impl Error for AllocError {}

/// A failed [`Checked::reallocate`](crate::Checked::reallocate).
///
/// The backend leaves the original allocation untouched when a resize
/// fails, so the block is handed back to the caller along with the cause.
#[derive(Debug)]
pub struct ReallocFailed {
    pub(crate) block: Block,
    pub(crate) error: AllocError,
}

impl ReallocFailed {
    /// The underlying allocation error.
    pub fn error(&self) -> &AllocError {
        &self.error
    }

    /// Recover the original, still-valid block and the error.
    pub fn into_parts(self) -> (Block, AllocError) {
        (self.block, self.error)
    }
}

impl fmt::Display for ReallocFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reallocation of {}-byte block failed: {}",
            self.block.size(),
            self.error
        )
    }
}

impl Error for ReallocFailed {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_message_names_the_request() {
        let err = AllocError::OutOfMemory {
            size: 4096,
            align: 16,
        };
        assert_eq!(
            err.to_string(),
            "could not allocate required memory: 4096 bytes (align 16)"
        );
    }

    #[test]
    fn realloc_failed_exposes_source() {
        let failed = ReallocFailed {
            block: Block::empty(8),
            error: AllocError::OutOfMemory { size: 64, align: 8 },
        };
        let source = failed.source().map(|e| e.to_string());
        assert_eq!(
            source.as_deref(),
            Some("could not allocate required memory: 64 bytes (align 8)")
        );
        let (block, error) = failed.into_parts();
        assert!(block.is_empty());
        assert!(matches!(error, AllocError::OutOfMemory { size: 64, .. }));
    }
}
