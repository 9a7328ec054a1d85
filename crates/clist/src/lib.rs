//! Header-prefixed growable arrays.
//!
//! A [`CompactList`] keeps its length and capacity in a two-word header
//! stored in the same heap block as its elements, directly in front of
//! slot 0. The element storage, length and capacity are all reached
//! through a single pointer (to slot 0), one indirection deep. Besides
//! that pointer the list value carries its allocator and [`ListConfig`].
//!
//! # Capacity policy
//!
//! - **Initialize:** the first allocation holds `default_capacity` (3) slots.
//! - **Grow:** a full list reallocates to `floor(1.5 * (capacity + 1))`.
//! - **Shrink:** after a removal, if `len < 0.5 * capacity` and
//!   `len > min_capacity` (1), the block shrinks to exactly `len` slots.
//!
//! One append, insert, remove or pop performs at most one reallocation.
//! Tunable through [`ListConfig`].
//!
//! # Allocation failure
//!
//! All allocation goes through [`clist_alloc::Checked`]. By default a
//! failure surfaces as [`ListError::Alloc`] and leaves the list as it was;
//! with [`FailurePolicy::Abort`] the process aborts instead.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod error;
pub mod layout;
pub mod list;
pub mod stats;

// Public re-exports for the primary API surface.
pub use clist_alloc::{AllocConfig, AllocError, FailurePolicy, Global, RawAlloc};
pub use config::ListConfig;
pub use error::ListError;
pub use layout::ListLayout;
pub use list::CompactList;
pub use stats::ListStats;
