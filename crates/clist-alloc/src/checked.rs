//! The checked allocator.
//!
//! [`Checked`] turns a [`RawAlloc`] backend that may return null into one
//! that never hands out a null block for a non-zero request. Failures are
//! either returned or fatal, depending on the configured
//! [`FailurePolicy`].

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::block::Block;
use crate::config::{AllocConfig, FailurePolicy};
use crate::error::{AllocError, ReallocFailed};
use crate::raw::{Global, RawAlloc};

/// Allocator wrapper enforcing the "never null for a non-zero request"
/// contract.
///
/// Zero-byte requests are not failures: they produce the empty
/// [`Block`], which is never passed to the backend.
#[derive(Clone, Debug, Default)]
pub struct Checked<A: RawAlloc = Global> {
    backend: A,
    config: AllocConfig,
}

impl Checked<Global> {
    /// Checked global allocator that propagates failures.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Checked global allocator that aborts the process on failure.
    pub fn aborting() -> Self {
        Self {
            backend: Global,
            config: AllocConfig::aborting(),
        }
    }
}

impl<A: RawAlloc> Checked<A> {
    /// Wrap `backend` with the default configuration.
    pub fn new_in(backend: A) -> Self {
        Self {
            backend,
            config: AllocConfig::default(),
        }
    }

    /// Wrap `backend` with an explicit configuration.
    ///
    /// Returns `Err` if the configuration does not validate.
    pub fn with_config(backend: A, config: AllocConfig) -> Result<Self, AllocError> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &AllocConfig {
        &self.config
    }

    /// The active failure policy.
    pub fn policy(&self) -> FailurePolicy {
        self.config.policy
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &A {
        &self.backend
    }

    /// Allocate `size` uninitialised bytes at the default alignment.
    pub fn allocate(&self, size: usize) -> Result<Block, AllocError> {
        self.allocate_aligned(size, self.config.default_align)
    }

    /// Allocate `size` uninitialised bytes at `align`.
    pub fn allocate_aligned(&self, size: usize, align: usize) -> Result<Block, AllocError> {
        let layout = self.layout(size, align)?;
        if size == 0 {
            return Ok(Block::empty(align));
        }
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { self.backend.alloc(layout) };
        self.adopt(raw, layout)
    }

    /// Allocate `elem_size * count` zeroed bytes at the default alignment.
    pub fn zero_allocate(&self, elem_size: usize, count: usize) -> Result<Block, AllocError> {
        let size = elem_size
            .checked_mul(count)
            .ok_or_else(|| self.fail(AllocError::SizeOverflow { elem_size, count }))?;
        let align = self.config.default_align;
        let layout = self.layout(size, align)?;
        if size == 0 {
            return Ok(Block::empty(align));
        }
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { self.backend.alloc_zeroed(layout) };
        self.adopt(raw, layout)
    }

    /// Resize `block` to `new_size` bytes, keeping its alignment.
    ///
    /// Consumes `block`; on success the returned block replaces it and
    /// every address into the old block is invalid. The leading
    /// `min(old, new)` bytes are preserved. An empty `block` is allocated
    /// fresh; `new_size == 0` frees it and returns the empty block.
    ///
    /// On failure the original block is still valid and comes back inside
    /// the [`ReallocFailed`].
    pub fn reallocate(&self, block: Block, new_size: usize) -> Result<Block, ReallocFailed> {
        let align = block.align();
        if block.is_empty() {
            return self
                .allocate_aligned(new_size, align)
                .map_err(|error| ReallocFailed { block, error });
        }
        if new_size == 0 {
            self.free(block);
            return Ok(Block::empty(align));
        }
        let new_layout = match self.layout(new_size, align) {
            Ok(layout) => layout,
            Err(error) => return Err(ReallocFailed { block, error }),
        };

        let old_size = block.size();
        let (old_ptr, old_layout) = block.into_raw_parts();
        // SAFETY: `old_ptr`/`old_layout` describe a live block from this
        // backend (Block ownership), and `new_layout` validated `new_size`
        // against the same alignment.
        let raw = unsafe { self.backend.realloc(old_ptr.as_ptr(), old_layout, new_size) };
        match NonNull::new(raw) {
            Some(ptr) => {
                tracing::trace!(old_size, new_size, align, "reallocated block");
                // SAFETY: fresh block of `new_layout` from the backend.
                Ok(unsafe { Block::from_raw_parts(ptr, new_layout) })
            }
            None => {
                // SAFETY: a failed realloc leaves the old block untouched
                // (RawAlloc contract); ownership returns to the caller.
                let block = unsafe { Block::from_raw_parts(old_ptr, old_layout) };
                let error = self.fail(AllocError::OutOfMemory {
                    size: new_size,
                    align,
                });
                Err(ReallocFailed { block, error })
            }
        }
    }

    /// Allocate `size` bytes and copy the first `size` bytes of `src` into
    /// them. The copy has the source's alignment and is independently owned.
    pub fn copy_block(&self, src: &Block, size: usize) -> Result<Block, AllocError> {
        if size > src.size() {
            return Err(self.fail(AllocError::CopyOverrun {
                requested: size,
                available: src.size(),
            }));
        }
        let copy = self.allocate_aligned(size, src.align())?;
        if size > 0 {
            // SAFETY: `src` owns at least `size` bytes, `copy` owns exactly
            // `size` fresh bytes, and distinct live blocks never overlap.
            unsafe { ptr::copy_nonoverlapping(src.as_ptr(), copy.as_ptr(), size) };
        }
        Ok(copy)
    }

    /// Return `block` to the backend. The empty block is ignored.
    pub fn free(&self, block: Block) {
        if block.is_empty() {
            return;
        }
        let (ptr, layout) = block.into_raw_parts();
        tracing::trace!(size = layout.size(), align = layout.align(), "freed block");
        // SAFETY: Block ownership guarantees a live allocation with this
        // layout from this backend.
        unsafe { self.backend.dealloc(ptr.as_ptr(), layout) };
    }

    fn layout(&self, size: usize, align: usize) -> Result<Layout, AllocError> {
        Layout::from_size_align(size, align)
            .map_err(|_| self.fail(AllocError::InvalidLayout { size, align }))
    }

    fn adopt(&self, raw: *mut u8, layout: Layout) -> Result<Block, AllocError> {
        match NonNull::new(raw) {
            Some(ptr) => {
                tracing::trace!(size = layout.size(), align = layout.align(), "allocated block");
                // SAFETY: fresh block of `layout` from the backend.
                Ok(unsafe { Block::from_raw_parts(ptr, layout) })
            }
            None => Err(self.fail(AllocError::OutOfMemory {
                size: layout.size(),
                align: layout.align(),
            })),
        }
    }

    /// Apply the failure policy to `error`: hand it back under
    /// [`FailurePolicy::Propagate`], never return under
    /// [`FailurePolicy::Abort`].
    ///
    /// Callers that size blocks themselves route their own overflow
    /// errors through here so the policy covers them too.
    pub fn fail(&self, error: AllocError) -> AllocError {
        match self.config.policy {
            FailurePolicy::Propagate => error,
            FailurePolicy::Abort => abort_on(&error),
        }
    }
}

#[cold]
fn abort_on(error: &AllocError) -> ! {
    tracing::error!(%error, "allocation failed, aborting");
    eprintln!("clist-alloc: {error}. Exiting.");
    std::process::abort()
}
