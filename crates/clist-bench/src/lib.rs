//! Benchmark workloads for the clist compact list.
//!
//! Provides pre-built list states for benchmarking:
//!
//! - [`filled`]: a list populated by `n` appends
//! - [`scattered_indices`]: deterministic in-bounds insertion points

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use clist::{CompactList, ListError};

/// Build a list holding `0..n` via repeated appends.
pub fn filled(n: u64) -> Result<CompactList<u64>, ListError> {
    let mut list = CompactList::new();
    for i in 0..n {
        list.append(i)?;
    }
    Ok(list)
}

/// Generate `n` deterministic insertion points.
///
/// Point `i` lies in `0..=i`, so inserting at each in order into an
/// initially empty list never goes out of bounds.
pub fn scattered_indices(n: usize, seed: u64) -> Vec<usize> {
    (0..n)
        .map(|i| {
            let mixed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(i as u64 * 1442695040888963407);
            (mixed >> 33) as usize % (i + 1)
        })
        .collect()
}
