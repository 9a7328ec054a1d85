//! Integration test: random operation sequences against a `Vec` model.
//!
//! Each case applies an arbitrary interleaving of list operations to a
//! `CompactList` on a `CountingAlloc` and to a plain `Vec`. After every
//! step the contents must match, `len <= capacity` and
//! `capacity >= min_capacity` must hold, and the backend must hold exactly
//! the one block the list's capacity implies.

use clist::{CompactList, ListConfig, ListError, ListLayout};
use clist_test_utils::CountingAlloc;
use proptest::prelude::*;
use proptest::sample::Index;

#[derive(Clone, Debug)]
enum Op {
    Append(i32),
    Insert(i32, Index),
    Remove(Index),
    Pop,
    ChangeCapacity(usize),
    Grow,
    Shrink,
    Initialize,
    Delete,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => any::<i32>().prop_map(Op::Append),
        3 => (any::<i32>(), any::<Index>()).prop_map(|(v, i)| Op::Insert(v, i)),
        3 => any::<Index>().prop_map(Op::Remove),
        3 => Just(Op::Pop),
        1 => (0usize..20).prop_map(Op::ChangeCapacity),
        1 => Just(Op::Grow),
        1 => Just(Op::Shrink),
        1 => Just(Op::Initialize),
        1 => Just(Op::Delete),
    ]
}

/// Apply `op` to both sides, checking the list's answer against the model.
fn apply(
    list: &mut CompactList<i32, &CountingAlloc>,
    model: &mut Vec<i32>,
    op: Op,
) -> Result<(), TestCaseError> {
    match op {
        Op::Append(v) => {
            list.append(v).unwrap();
            model.push(v);
        }
        Op::Insert(v, pick) => {
            let index = pick.index(model.len() + 1);
            list.insert(v, index).unwrap();
            model.insert(index, v);
        }
        Op::Remove(pick) => {
            if model.is_empty() {
                let err = list.remove(0).unwrap_err();
                prop_assert_eq!(err, ListError::IndexOutOfBounds { index: 0, len: 0 });
            } else {
                let index = pick.index(model.len());
                prop_assert_eq!(list.remove(index).unwrap(), model.remove(index));
            }
        }
        Op::Pop => {
            prop_assert_eq!(list.pop(), model.pop());
        }
        Op::ChangeCapacity(extra) => {
            let requested = model.len() + extra;
            let before = list.capacity();
            let result = list.change_capacity(requested);
            if !list.is_allocated() {
                prop_assert!(result.is_ok());
            } else if requested < ListConfig::MIN_CAPACITY {
                prop_assert!(matches!(result, Err(ListError::CapacityBelowMinimum { .. })), "expected CapacityBelowMinimum, got {:?}", result);
                prop_assert_eq!(list.capacity(), before);
            } else {
                prop_assert!(result.is_ok());
                prop_assert_eq!(list.capacity(), requested);
            }
        }
        Op::Grow => {
            let was_full = list.is_allocated() && list.len() == list.capacity();
            let before = list.capacity();
            list.grow().unwrap();
            if was_full {
                prop_assert!(list.capacity() > before);
            } else {
                prop_assert_eq!(list.capacity(), before);
            }
        }
        Op::Shrink => list.shrink().unwrap(),
        Op::Initialize => {
            let was_allocated = list.is_allocated();
            let before = list.capacity();
            list.initialize().unwrap();
            if was_allocated {
                prop_assert_eq!(list.capacity(), before);
            } else {
                prop_assert_eq!(list.capacity(), ListConfig::DEFAULT_CAPACITY);
            }
        }
        Op::Delete => {
            list.delete();
            model.clear();
            prop_assert!(!list.is_allocated());
        }
    }
    Ok(())
}

fn check_invariants(
    list: &CompactList<i32, &CountingAlloc>,
    model: &[i32],
    backend: &CountingAlloc,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(list.to_vec(), model.to_vec());
    prop_assert_eq!(list.len(), model.len());
    prop_assert!(list.len() <= list.capacity());
    if list.is_allocated() {
        prop_assert!(list.capacity() >= ListConfig::MIN_CAPACITY);
        prop_assert_eq!(backend.live_blocks(), 1);
        let expected = ListLayout::<i32>::block_layout(list.capacity()).unwrap();
        prop_assert_eq!(backend.layout_of(list.stats().address), Some(expected));
    } else {
        prop_assert_eq!(list.capacity(), 0);
        prop_assert_eq!(backend.live_blocks(), 0);
    }
    Ok(())
}

proptest! {
    #[test]
    fn random_operations_match_vec_model(ops in proptest::collection::vec(arb_op(), 0..120)) {
        let backend = CountingAlloc::new();
        let mut list = CompactList::new_in(&backend);
        let mut model = Vec::new();
        for op in ops {
            apply(&mut list, &mut model, op)?;
            check_invariants(&list, &model, &backend)?;
        }
        list.delete();
        prop_assert_eq!(backend.live_blocks(), 0);
    }
}
