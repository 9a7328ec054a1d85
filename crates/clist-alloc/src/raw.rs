//! Pass-through allocation backends.
//!
//! [`RawAlloc`] is the thin seam between the checked allocator and the
//! memory source. Implementations may return null; turning null into an
//! error or an abort is [`Checked`](crate::Checked)'s job, not theirs.

use std::alloc::{self, Layout};

/// A raw memory source.
///
/// The method contracts mirror [`std::alloc::GlobalAlloc`], so a backend
/// can forward straight to it.
///
/// # Safety
///
/// Implementors must return either null or a pointer to a fresh block that
/// satisfies the requested layout and stays valid until passed to
/// `realloc` or `dealloc` with the same layout. A failed `realloc` must
/// leave the original block untouched.
pub unsafe trait RawAlloc {
    /// Allocate an uninitialised block.
    ///
    /// # Safety
    ///
    /// `layout` must have a non-zero size.
    unsafe fn alloc(&self, layout: Layout) -> *mut u8;

    /// Allocate a zero-filled block.
    ///
    /// # Safety
    ///
    /// `layout` must have a non-zero size.
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded caller contract.
        let ptr = unsafe { self.alloc(layout) };
        if !ptr.is_null() {
            // SAFETY: `ptr` is a fresh block of `layout.size()` bytes.
            unsafe { std::ptr::write_bytes(ptr, 0, layout.size()) };
        }
        ptr
    }

    /// Resize a block, preserving the first `min(old, new)` bytes.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this backend with `layout`, and
    /// `new_size` must be non-zero and form a valid layout with
    /// `layout.align()`.
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8;

    /// Release a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this backend with `layout` and not
    /// released since.
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout);
}

/// Forwards to the process-wide global allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: every method forwards to `std::alloc` with the caller's contract.
unsafe impl RawAlloc for Global {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: non-zero size per caller contract.
        unsafe { alloc::alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: non-zero size per caller contract.
        unsafe { alloc::alloc_zeroed(layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: `ptr`/`layout` come from this allocator per caller contract.
        unsafe { alloc::realloc(ptr, layout, new_size) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: `ptr`/`layout` come from this allocator per caller contract.
        unsafe { alloc::dealloc(ptr, layout) }
    }
}

// SAFETY: a shared reference forwards to the same backend.
unsafe impl<A: RawAlloc + ?Sized> RawAlloc for &A {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).alloc_zeroed(layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).realloc(ptr, layout, new_size) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).dealloc(ptr, layout) }
    }
}
