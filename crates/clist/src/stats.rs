//! Point-in-time description of a list's block.

use std::fmt;

/// Size and placement of a [`CompactList`](crate::CompactList)'s block.
///
/// All fields are 0 for an unallocated list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListStats {
    /// Bytes per element slot.
    pub elem_size: usize,
    /// Elements in use.
    pub len: usize,
    /// Allocated element slots.
    pub capacity: usize,
    /// Total block size, header included.
    pub block_bytes: usize,
    /// Block start address.
    pub address: usize,
}

impl fmt::Display for ListStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "clist: datatype_size: {}, length: {}, capacity: {} @ {:#x}",
            self.elem_size, self.len, self.capacity, self.address
        )
    }
}
