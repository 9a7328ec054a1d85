//! Test utilities and mock allocators for clist development.
//!
//! Provides a bookkeeping [`CountingAlloc`] backend (live-block table,
//! operation counters, failure injection) and element fixtures
//! ([`DropCounter`]) for observing what a list does with its memory and
//! its elements.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod counting;
pub mod fixtures;

pub use counting::{AllocCounts, CountingAlloc};
pub use fixtures::{DropCounter, DropLog};
