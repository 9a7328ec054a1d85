//! A bookkeeping allocator backend.
//!
//! [`CountingAlloc`] forwards to the global allocator and records every
//! live block (address → layout) in an `IndexMap`, so tests can assert
//! exactly which blocks exist, that frees use the layout the block was
//! allocated with, and how many requests an operation made. A request
//! budget turns it into a failure injector.

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr;

use clist_alloc::{Global, RawAlloc};
use indexmap::IndexMap;

/// Operation counters for a [`CountingAlloc`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocCounts {
    /// Successful fresh allocations (plain and zeroed).
    pub allocs: usize,
    /// Successful reallocations.
    pub reallocs: usize,
    /// Blocks released.
    pub frees: usize,
    /// Requests refused because the budget ran out.
    pub failures: usize,
}

/// Global-allocator backend with a live-block table and a request budget.
///
/// Single-threaded by construction (interior mutability via `Cell` /
/// `RefCell`). Lists borrow it as `&CountingAlloc`, which implements
/// [`RawAlloc`] through the blanket reference impl.
///
/// # Panics
///
/// `dealloc`/`realloc` panic when handed a block the table does not know
/// or a layout different from the recorded one: those are exactly the
/// bugs this type exists to catch.
#[derive(Debug, Default)]
pub struct CountingAlloc {
    live: RefCell<IndexMap<usize, Layout>>,
    counts: Cell<AllocCounts>,
    /// Remaining requests that may succeed; `None` is unlimited.
    budget: Cell<Option<usize>>,
}

impl CountingAlloc {
    /// Unlimited budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `n` successful allocation/reallocation requests, then
    /// return null for every later one.
    pub fn failing_after(n: usize) -> Self {
        let alloc = Self::new();
        alloc.set_budget(Some(n));
        alloc
    }

    /// Replace the remaining request budget.
    pub fn set_budget(&self, budget: Option<usize>) {
        self.budget.set(budget);
    }

    /// Snapshot of the operation counters.
    pub fn counts(&self) -> AllocCounts {
        self.counts.get()
    }

    /// Number of blocks currently allocated.
    pub fn live_blocks(&self) -> usize {
        self.live.borrow().len()
    }

    /// Total bytes across live blocks.
    pub fn live_bytes(&self) -> usize {
        self.live.borrow().values().map(Layout::size).sum()
    }

    /// Recorded layout of the live block starting at `addr`.
    pub fn layout_of(&self, addr: usize) -> Option<Layout> {
        self.live.borrow().get(&addr).copied()
    }

    /// Live blocks in allocation order, as `(address, layout)`.
    pub fn live(&self) -> Vec<(usize, Layout)> {
        self.live
            .borrow()
            .iter()
            .map(|(&addr, &layout)| (addr, layout))
            .collect()
    }

    fn take_budget(&self) -> bool {
        match self.budget.get() {
            None => true,
            Some(0) => {
                self.bump(|c| c.failures += 1);
                false
            }
            Some(n) => {
                self.budget.set(Some(n - 1));
                true
            }
        }
    }

    fn bump(&self, f: impl FnOnce(&mut AllocCounts)) {
        let mut counts = self.counts.get();
        f(&mut counts);
        self.counts.set(counts);
    }

    fn forget(&self, ptr: *mut u8, layout: Layout) {
        let recorded = self
            .live
            .borrow_mut()
            .shift_remove(&ptr.addr())
            .unwrap_or_else(|| panic!("block {ptr:p} is not live"));
        assert_eq!(
            recorded, layout,
            "block {ptr:p} released with a layout it was not allocated with"
        );
    }

    fn record(&self, ptr: *mut u8, layout: Layout) {
        let previous = self.live.borrow_mut().insert(ptr.addr(), layout);
        assert!(previous.is_none(), "block {ptr:p} handed out twice");
    }
}

// SAFETY: every successful request forwards to `Global`; a refused
// request returns null without touching any block.
unsafe impl RawAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if !self.take_budget() {
            return ptr::null_mut();
        }
        // SAFETY: forwarded caller contract.
        let ptr = unsafe { Global.alloc(layout) };
        if !ptr.is_null() {
            self.record(ptr, layout);
            self.bump(|c| c.allocs += 1);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if !self.take_budget() {
            return ptr::null_mut();
        }
        // SAFETY: forwarded caller contract.
        let ptr = unsafe { Global.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.record(ptr, layout);
            self.bump(|c| c.allocs += 1);
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if !self.take_budget() {
            return ptr::null_mut();
        }
        self.forget(ptr, layout);
        // SAFETY: forwarded caller contract; the block was live with `layout`.
        let new_ptr = unsafe { Global.realloc(ptr, layout, new_size) };
        if new_ptr.is_null() {
            self.record(ptr, layout);
        } else {
            // `new_size` is valid with this alignment per caller contract.
            let new_layout = Layout::from_size_align(new_size, layout.align())
                .unwrap_or_else(|e| panic!("caller passed an invalid new size: {e}"));
            self.record(new_ptr, new_layout);
            self.bump(|c| c.reallocs += 1);
        }
        new_ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.forget(ptr, layout);
        // SAFETY: the block was live with `layout`.
        unsafe { Global.dealloc(ptr, layout) };
        self.bump(|c| c.frees += 1);
    }
}
