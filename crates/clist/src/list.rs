//! The compact list container.
//!
//! A [`CompactList`] owns at most one heap block laid out as described in
//! [`layout`](crate::layout): a two-word header followed by the element
//! slots. The list's only pointer is the handle to slot 0; length and
//! capacity are read back through it, and every capacity change moves the
//! handle to the reallocated block.

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::ptr::{self, NonNull};

use clist_alloc::{AllocConfig, AllocError, Block, Checked, Global, RawAlloc};

use crate::config::ListConfig;
use crate::error::ListError;
use crate::layout::{Header, ListLayout};
use crate::stats::ListStats;

/// A growable array storing its length and capacity in the same
/// allocation as its elements.
///
/// Starts unallocated; the first [`initialize`](Self::initialize) (or the
/// first insertion) allocates `default_capacity` slots. Appends grow the
/// block by `floor(growth_factor * (capacity + 1))` when full; removals
/// shrink it to exactly `len` slots once `len < shrink_factor * capacity`,
/// never going below `min_capacity`.
///
/// Not thread-safe: the list is neither `Send` nor `Sync`.
pub struct CompactList<T, A: RawAlloc = Global> {
    /// Handle to slot 0, or `None` while unallocated.
    elems: Option<NonNull<T>>,
    alloc: Checked<A>,
    config: ListConfig,
    _owns: PhantomData<T>,
}

impl<T> CompactList<T> {
    /// An unallocated list on the global allocator.
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<T> Default for CompactList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: RawAlloc> CompactList<T, A> {
    /// An unallocated list on `backend` with default policies.
    pub fn new_in(backend: A) -> Self {
        Self {
            elems: None,
            alloc: Checked::new_in(backend),
            config: ListConfig::default(),
            _owns: PhantomData,
        }
    }

    /// An unallocated list with explicit allocator and capacity policies.
    pub fn with_config(
        backend: A,
        alloc_config: AllocConfig,
        config: ListConfig,
    ) -> Result<Self, ListError> {
        config.validate()?;
        Ok(Self {
            elems: None,
            alloc: Checked::with_config(backend, alloc_config)?,
            config,
            _owns: PhantomData,
        })
    }

    /// The checked allocator backing this list.
    pub fn allocator(&self) -> &Checked<A> {
        &self.alloc
    }

    /// The capacity policy.
    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Allocate the header and `default_capacity` slots.
    ///
    /// Does nothing if the list is already allocated.
    pub fn initialize(&mut self) -> Result<(), ListError> {
        self.ensure_allocated().map(|_| ())
    }

    /// Number of elements in use. 0 when unallocated.
    pub fn len(&self) -> usize {
        self.header().map_or(0, |h| h.len)
    }

    /// Number of allocated slots. 0 when unallocated.
    pub fn capacity(&self) -> usize {
        self.header().map_or(0, |h| h.cap)
    }

    /// Whether the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the list currently owns a block.
    pub fn is_allocated(&self) -> bool {
        self.elems.is_some()
    }

    /// Size of one element slot in bytes, or 0 when unallocated.
    pub fn elem_size(&self) -> usize {
        if self.is_allocated() {
            ListLayout::<T>::ELEM_SIZE
        } else {
            0
        }
    }

    /// Reallocate to exactly `new_capacity` slots.
    ///
    /// No-op when unallocated. Every address into the old block is
    /// invalid afterwards. Fails without touching the list if
    /// `new_capacity` is below the current length or the configured
    /// minimum, or if the allocator fails.
    pub fn change_capacity(&mut self, new_capacity: usize) -> Result<(), ListError> {
        let Some(elems) = self.elems else {
            return Ok(());
        };
        let len = self.len();
        if new_capacity < len {
            return Err(ListError::CapacityBelowLength {
                requested: new_capacity,
                len,
            });
        }
        if new_capacity < self.config.min_capacity {
            return Err(ListError::CapacityBelowMinimum {
                requested: new_capacity,
                min: self.config.min_capacity,
            });
        }
        self.resize(elems, new_capacity).map(|_| ())
    }

    /// Grow a full list by the growth factor.
    ///
    /// Acts only when the next insertion would not fit
    /// (`len == capacity`); otherwise a no-op, as it is when unallocated.
    pub fn grow(&mut self) -> Result<(), ListError> {
        match self.elems {
            Some(elems) if self.len() == self.capacity() => self.grow_full(elems).map(|_| ()),
            _ => Ok(()),
        }
    }

    /// Shrink to exactly `len` slots if the list has dropped below the
    /// shrink threshold and is still above the minimum capacity.
    pub fn shrink(&mut self) -> Result<(), ListError> {
        let Some(elems) = self.elems else {
            return Ok(());
        };
        let len = self.len();
        if self.config.should_shrink(len, self.capacity()) {
            self.resize(elems, len)?;
        }
        Ok(())
    }

    /// Add `item` after the last element, allocating or growing as needed.
    pub fn append(&mut self, item: T) -> Result<(), ListError> {
        let len = self.len();
        let elems = self.make_room()?;
        // SAFETY: make_room guarantees slot `len` is within capacity.
        unsafe { elems.add(len).write(item) };
        self.set_len(elems, len + 1);
        Ok(())
    }

    /// Same as [`append`](Self::append).
    pub fn push(&mut self, item: T) -> Result<(), ListError> {
        self.append(item)
    }

    /// Insert `item` at `index`, shifting later elements right.
    ///
    /// `index` may equal `len` (insert at the end). A larger index fails
    /// with [`ListError::IndexOutOfBounds`] and leaves the list untouched.
    pub fn insert(&mut self, item: T, index: usize) -> Result<(), ListError> {
        let len = self.len();
        if index > len {
            return Err(ListError::IndexOutOfBounds { index, len });
        }
        let elems = self.make_room()?;
        // SAFETY: `index <= len < capacity`, so both the shifted range
        // `[index, len)` and its destination `[index + 1, len + 1)` are
        // inside the block; `ptr::copy` handles the overlap.
        unsafe {
            let slot = elems.as_ptr().add(index);
            ptr::copy(slot, slot.add(1), len - index);
            slot.write(item);
        }
        self.set_len(elems, len + 1);
        Ok(())
    }

    /// Remove and return the element at `index`, shifting later elements
    /// left. May shrink the block.
    pub fn remove(&mut self, index: usize) -> Result<T, ListError> {
        let len = self.len();
        let elems = match self.elems {
            Some(elems) if index < len => elems,
            _ => return Err(ListError::IndexOutOfBounds { index, len }),
        };
        // SAFETY: `index < len`; slot `index` is initialised and is moved
        // out before the tail `(index, len)` slides over it.
        let item = unsafe {
            let slot = elems.as_ptr().add(index);
            let item = slot.read();
            ptr::copy(slot.add(1), slot, len - index - 1);
            item
        };
        self.set_len(elems, len - 1);
        self.shrink_after_removal();
        Ok(item)
    }

    /// Remove and return the last element, or `None` if the list is empty.
    /// May shrink the block.
    pub fn pop(&mut self) -> Option<T> {
        let elems = self.elems?;
        let len = self.len();
        if len == 0 {
            return None;
        }
        // SAFETY: slot `len - 1` is initialised and becomes logically
        // uninitialised once the length drops.
        let item = unsafe { elems.add(len - 1).read() };
        self.set_len(elems, len - 1);
        self.shrink_after_removal();
        Some(item)
    }

    /// Drop every element and free the block, leaving the list
    /// unallocated. A deleted list can be reused.
    pub fn delete(&mut self) {
        let Some(elems) = self.elems.take() else {
            return;
        };
        let Header { len, cap } = read_header(elems);
        // SAFETY: the first `len` slots are initialised and no longer
        // reachable through `self`.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(elems.as_ptr(), len)) };
        match ListLayout::<T>::block_layout(cap) {
            Ok(layout) => {
                // SAFETY: the block was allocated by `self.alloc` with
                // exactly this layout and is released once.
                let block = unsafe { Block::from_raw_parts(ListLayout::<T>::block_start(elems), layout) };
                self.alloc.free(block);
                tracing::debug!(len, capacity = cap, "deleted compact list");
            }
            Err(error) => {
                tracing::error!(%error, capacity = cap, "corrupt capacity, leaking block");
            }
        }
    }

    /// Shared reference to the element at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Copy the elements out into a `Vec`.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.as_slice().to_vec()
    }

    /// Size and placement of the list's block.
    pub fn stats(&self) -> ListStats {
        let capacity = self.capacity();
        ListStats {
            elem_size: self.elem_size(),
            len: self.len(),
            capacity,
            block_bytes: match self.elems {
                Some(_) => ListLayout::<T>::block_size(capacity).unwrap_or(0),
                None => 0,
            },
            address: self.elems.map_or(0, |elems| {
                // SAFETY: live handle.
                unsafe { ListLayout::<T>::block_start(elems) }.as_ptr().addr()
            }),
        }
    }

    fn as_slice(&self) -> &[T] {
        match self.elems {
            // SAFETY: the first `len` slots are initialised and borrowed
            // for no longer than `self`.
            Some(elems) => unsafe { std::slice::from_raw_parts(elems.as_ptr(), self.len()) },
            None => &[],
        }
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        match self.elems {
            // SAFETY: as `as_slice`, with exclusive access through `&mut self`.
            Some(elems) => unsafe { std::slice::from_raw_parts_mut(elems.as_ptr(), self.len()) },
            None => &mut [],
        }
    }

    fn header(&self) -> Option<Header> {
        self.elems.map(read_header)
    }

    fn set_len(&mut self, elems: NonNull<T>, len: usize) {
        // SAFETY: `elems` is this list's live handle; `&mut self` gives
        // exclusive access to the header.
        unsafe { (*ListLayout::<T>::header(elems).as_ptr()).len = len };
    }

    /// Allocate the initial block if there is none; return the handle.
    fn ensure_allocated(&mut self) -> Result<NonNull<T>, ListError> {
        if let Some(elems) = self.elems {
            return Ok(elems);
        }
        let cap = self.config.default_capacity;
        let layout = self.block_layout(cap)?;
        let block = self.alloc.allocate_aligned(layout.size(), layout.align())?;
        let (start, _) = block.into_raw_parts();
        // SAFETY: fresh block of at least ELEMS_OFFSET bytes at ALIGN.
        let elems = unsafe { ListLayout::<T>::elems(start) };
        // SAFETY: the header slot lies inside the fresh block.
        unsafe { ListLayout::<T>::header(elems).write(Header { len: 0, cap }) };
        self.elems = Some(elems);
        tracing::debug!(capacity = cap, bytes = layout.size(), "initialized compact list");
        Ok(elems)
    }

    /// Handle of a block with at least one free slot.
    fn make_room(&mut self) -> Result<NonNull<T>, ListError> {
        let elems = self.ensure_allocated()?;
        let Header { len, cap } = read_header(elems);
        if len < cap {
            Ok(elems)
        } else {
            self.grow_full(elems)
        }
    }

    fn grow_full(&mut self, elems: NonNull<T>) -> Result<NonNull<T>, ListError> {
        let cap = read_header(elems).cap;
        let new_cap = self
            .config
            .grown_capacity(cap)
            .ok_or_else(|| {
                self.alloc.fail(AllocError::SizeOverflow {
                    elem_size: ListLayout::<T>::ELEM_SIZE,
                    count: cap,
                })
            })?;
        self.resize(elems, new_cap)
    }

    /// Reallocate the block behind `elems` to `new_cap` slots and
    /// repoint the handle. On failure the list is unchanged.
    fn resize(&mut self, elems: NonNull<T>, new_cap: usize) -> Result<NonNull<T>, ListError> {
        let old_cap = read_header(elems).cap;
        if new_cap == old_cap {
            return Ok(elems);
        }
        let old_layout = self.block_layout(old_cap)?;
        let new_size = self.block_layout(new_cap)?.size();
        // SAFETY: the list owns the block described by `old_layout`; the
        // reconstructed Block is handed straight to `reallocate`.
        let block = unsafe { Block::from_raw_parts(ListLayout::<T>::block_start(elems), old_layout) };
        match self.alloc.reallocate(block, new_size) {
            Ok(block) => {
                let (start, _) = block.into_raw_parts();
                // SAFETY: the new block keeps the header and first
                // `min(old, new)` bytes, so the header is intact.
                let elems = unsafe { ListLayout::<T>::elems(start) };
                // SAFETY: live handle into the new block, owned by `self`.
                unsafe { (*ListLayout::<T>::header(elems).as_ptr()).cap = new_cap };
                self.elems = Some(elems);
                tracing::debug!(
                    old_capacity = old_cap,
                    new_capacity = new_cap,
                    bytes = new_size,
                    "changed compact list capacity"
                );
                Ok(elems)
            }
            Err(failed) => {
                // The old block is still live and still owned via `elems`.
                let (_block, error) = failed.into_parts();
                Err(error.into())
            }
        }
    }

    /// Block layout for `capacity` slots. Overflow goes through the
    /// allocator's failure policy like any other allocation failure.
    fn block_layout(&self, capacity: usize) -> Result<Layout, AllocError> {
        ListLayout::<T>::block_layout(capacity).map_err(|error| self.alloc.fail(error))
    }

    /// Elements are already gone when this runs, so a failed shrink only
    /// means the list keeps its larger block.
    fn shrink_after_removal(&mut self) {
        if let Err(error) = self.shrink() {
            tracing::warn!(%error, capacity = self.capacity(), "shrink failed, keeping capacity");
        }
    }
}

impl<T: Copy, A: RawAlloc + Clone> CompactList<T, A> {
    /// A byte-for-byte copy of the whole block, header included.
    ///
    /// The copy has the same length and capacity and its own allocation.
    pub fn duplicate(&self) -> Result<Self, ListError> {
        let mut copy = Self {
            elems: None,
            alloc: self.alloc.clone(),
            config: self.config.clone(),
            _owns: PhantomData,
        };
        let Some(elems) = self.elems else {
            return Ok(copy);
        };
        let layout = self.block_layout(read_header(elems).cap)?;
        // SAFETY: a borrowed view of this list's block; it is taken apart
        // again below and never freed through this value.
        let source = unsafe { Block::from_raw_parts(ListLayout::<T>::block_start(elems), layout) };
        let copied = self.alloc.copy_block(&source, layout.size());
        let _ = source.into_raw_parts();
        let (start, _) = copied?.into_raw_parts();
        // SAFETY: the copy has the source's size and alignment.
        copy.elems = Some(unsafe { ListLayout::<T>::elems(start) });
        Ok(copy)
    }
}

impl<T, A: RawAlloc> Drop for CompactList<T, A> {
    fn drop(&mut self) {
        self.delete();
    }
}

impl<T, A: RawAlloc> Index<usize> for CompactList<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len();
        match self.get(index) {
            Some(item) => item,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}

impl<T, A: RawAlloc> IndexMut<usize> for CompactList<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(item) => item,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for CompactList<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

fn read_header<T>(elems: NonNull<T>) -> Header {
    // SAFETY: only called with a live handle owned by a CompactList.
    unsafe { ListLayout::<T>::header(elems).read() }
}
