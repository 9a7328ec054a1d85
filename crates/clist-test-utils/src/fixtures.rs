//! Element fixtures for ownership tests.

use std::cell::Cell;
use std::rc::Rc;

/// Shared tally of [`DropCounter`] drops.
#[derive(Clone, Debug, Default)]
pub struct DropLog {
    drops: Rc<Cell<usize>>,
}

impl DropLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// An element tagged `id` that bumps this log when dropped.
    pub fn item(&self, id: u32) -> DropCounter {
        DropCounter {
            id,
            log: Rc::clone(&self.drops),
        }
    }

    /// Drops recorded so far.
    pub fn drops(&self) -> usize {
        self.drops.get()
    }
}

/// An element that records its own drop in a [`DropLog`].
#[derive(Debug)]
pub struct DropCounter {
    pub id: u32,
    log: Rc<Cell<usize>>,
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.log.set(self.log.get() + 1);
    }
}

impl PartialEq for DropCounter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_are_counted_once() {
        let log = DropLog::new();
        let a = log.item(1);
        let b = log.item(2);
        assert_eq!(log.drops(), 0);
        drop(a);
        assert_eq!(log.drops(), 1);
        let moved = b;
        assert_eq!(moved.id, 2);
        drop(moved);
        assert_eq!(log.drops(), 2);
    }
}
