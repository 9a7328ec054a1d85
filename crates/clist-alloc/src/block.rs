//! Owned raw allocations.
//!
//! A [`Block`] is the allocation handle handed out by
//! [`Checked`](crate::Checked). It is exclusively owned by its holder and
//! is only ever released by giving it back to the allocator that produced
//! it (`reallocate` or `free`). Dropping a non-empty block leaks it.

use std::alloc::Layout;
use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};

/// An owned, untyped heap block.
///
/// The empty block (size 0) stands for "no allocation": it holds a
/// dangling, well-aligned pointer and is never passed to the backend.
#[derive(Debug)]
#[must_use = "dropping a Block leaks it; return it with `Checked::free`"]
pub struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Block {
    /// The empty block with the given alignment.
    ///
    /// An alignment that is not a power of two falls back to 1.
    pub fn empty(align: usize) -> Self {
        let layout = Layout::from_size_align(0, align).unwrap_or(Layout::new::<()>());
        Self {
            ptr: dangling(layout.align()),
            layout,
        }
    }

    /// Reassemble a block from its raw parts.
    ///
    /// # Safety
    ///
    /// `ptr` and `layout` must describe a live allocation previously taken
    /// apart with [`Block::into_raw_parts`] (or a zero-size layout with any
    /// aligned, non-null pointer), and no other `Block` may own it.
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, layout: Layout) -> Self {
        Self { ptr, layout }
    }

    /// Give up ownership, returning the pointer and layout.
    pub fn into_raw_parts(self) -> (NonNull<u8>, Layout) {
        (self.ptr, self.layout)
    }

    /// Start address of the block.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Start address of the block as a `NonNull`.
    pub fn as_non_null(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Alignment in bytes.
    pub fn align(&self) -> usize {
        self.layout.align()
    }

    /// The layout the block was allocated with.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Whether this is the empty block.
    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    /// The block's bytes as possibly-uninitialised storage, for writing.
    pub fn as_uninit_mut(&mut self) -> &mut [MaybeUninit<u8>] {
        // SAFETY: the block owns `size` bytes at `ptr`; MaybeUninit places
        // no initialisation requirement on them.
        unsafe {
            std::slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<MaybeUninit<u8>>(), self.size())
        }
    }

    /// The block's bytes.
    ///
    /// # Safety
    ///
    /// Every byte must have been initialised (zero-allocated, copied, or
    /// written through [`Block::as_uninit_mut`]).
    pub unsafe fn as_bytes(&self) -> &[u8] {
        // SAFETY: ownership of `size` bytes; initialisation per caller.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.size()) }
    }
}

/// A non-null, `align`-aligned address with no provenance.
pub(crate) fn dangling(align: usize) -> NonNull<u8> {
    NonNull::new(ptr::without_provenance_mut::<u8>(align)).unwrap_or(NonNull::dangling())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_is_aligned_and_sizeless() {
        let block = Block::empty(32);
        assert!(block.is_empty());
        assert_eq!(block.size(), 0);
        assert_eq!(block.align(), 32);
        assert_eq!(block.as_ptr() as usize % 32, 0);
    }

    #[test]
    fn bad_alignment_falls_back_to_one() {
        let block = Block::empty(3);
        assert_eq!(block.align(), 1);
    }

    #[test]
    fn raw_parts_round_trip() {
        let block = Block::empty(8);
        let (ptr, layout) = block.into_raw_parts();
        let back = unsafe { Block::from_raw_parts(ptr, layout) };
        assert_eq!(back.as_non_null(), ptr);
        assert_eq!(back.layout(), layout);
    }

    #[test]
    fn empty_block_views_are_empty() {
        let mut block = Block::empty(8);
        assert!(block.as_uninit_mut().is_empty());
        assert!(unsafe { block.as_bytes() }.is_empty());
    }
}
