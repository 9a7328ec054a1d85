//! Memory layout of a compact list block.
//!
//! ```text
//! block start                     handle (elems)
//! │                               │
//! ▼                               ▼
//! [pad][ len: usize | cap: usize ][ T | T | T | ... cap slots ]
//!      └──────── Header ─────────┘
//! ```
//!
//! The header always sits immediately before slot 0, so it is reachable
//! from the handle alone at a fixed negative offset. Leading padding only
//! appears when `T` is aligned more strictly than the header is large.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;

use clist_alloc::AllocError;

/// Length and capacity, stored in-band before the elements.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) len: usize,
    pub(crate) cap: usize,
}

/// Offsets and sizes of a compact list block holding `T`.
pub struct ListLayout<T>(PhantomData<T>);

impl<T> ListLayout<T> {
    /// Header size: two machine words.
    pub const HEADER_SIZE: usize = size_of::<Header>();

    /// Size of one element slot.
    pub const ELEM_SIZE: usize = size_of::<T>();

    /// Byte offset of slot 0 from the block start.
    pub const ELEMS_OFFSET: usize = Self::HEADER_SIZE.next_multiple_of(align_of::<T>());

    /// Alignment of the whole block.
    pub const ALIGN: usize = if align_of::<T>() > align_of::<Header>() {
        align_of::<T>()
    } else {
        align_of::<Header>()
    };

    /// Total block size for `capacity` slots.
    pub fn block_size(capacity: usize) -> Result<usize, AllocError> {
        capacity
            .checked_mul(Self::ELEM_SIZE)
            .and_then(|bytes| bytes.checked_add(Self::ELEMS_OFFSET))
            .ok_or(AllocError::SizeOverflow {
                elem_size: Self::ELEM_SIZE,
                count: capacity,
            })
    }

    /// Block layout for `capacity` slots.
    pub fn block_layout(capacity: usize) -> Result<Layout, AllocError> {
        let size = Self::block_size(capacity)?;
        Layout::from_size_align(size, Self::ALIGN).map_err(|_| AllocError::InvalidLayout {
            size,
            align: Self::ALIGN,
        })
    }

    /// Header address for a list handle.
    ///
    /// # Safety
    ///
    /// `elems` must be the handle of a live compact list block for `T`.
    pub(crate) unsafe fn header(elems: NonNull<T>) -> NonNull<Header> {
        // SAFETY: the header occupies the HEADER_SIZE bytes right before
        // slot 0 inside the same block.
        unsafe { elems.cast::<u8>().sub(Self::HEADER_SIZE).cast() }
    }

    /// Block start for a list handle.
    ///
    /// # Safety
    ///
    /// `elems` must be the handle of a live compact list block for `T`.
    pub(crate) unsafe fn block_start(elems: NonNull<T>) -> NonNull<u8> {
        // SAFETY: slot 0 is ELEMS_OFFSET bytes into the block.
        unsafe { elems.cast::<u8>().sub(Self::ELEMS_OFFSET) }
    }

    /// List handle for a block start.
    ///
    /// # Safety
    ///
    /// `start` must point to a block of at least `ELEMS_OFFSET` bytes
    /// aligned to `ALIGN`.
    pub(crate) unsafe fn elems(start: NonNull<u8>) -> NonNull<T> {
        // SAFETY: in bounds per caller contract (one-past-the-end when the
        // block holds no slot bytes).
        unsafe { start.add(Self::ELEMS_OFFSET).cast() }
    }
}
