//! Integration test: the abort failure policy terminates the process.
//!
//! An aborting process cannot be observed from inside itself, so each
//! test re-runs this test binary filtered to itself with `CLIST_ABORT_CHILD`
//! set. The child performs the failing operation; the parent asserts the
//! child died with the allocator diagnostic on stderr.

use std::process::Command;

use clist::{AllocConfig, CompactList, ListConfig};
use clist_test_utils::CountingAlloc;

const CHILD_ENV: &str = "CLIST_ABORT_CHILD";

fn in_child() -> bool {
    std::env::var_os(CHILD_ENV).is_some()
}

/// Re-run `test_name` in a child process and return its stderr.
fn run_child(test_name: &str) -> String {
    let exe = std::env::current_exe().unwrap();
    let output = Command::new(exe)
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    assert!(
        !output.status.success(),
        "child should have aborted; stderr:\n{stderr}"
    );
    stderr
}

fn aborting_list(backend: &CountingAlloc) -> CompactList<u64, &CountingAlloc> {
    CompactList::with_config(backend, AllocConfig::aborting(), ListConfig::default()).unwrap()
}

#[test]
fn initialize_failure_aborts() {
    if in_child() {
        let backend = CountingAlloc::failing_after(0);
        let mut list = aborting_list(&backend);
        let _ = list.initialize();
        // Only reached if the policy did not abort; the parent sees a
        // clean exit and fails.
        std::process::exit(0);
    }
    let stderr = run_child("initialize_failure_aborts");
    assert!(stderr.contains("could not allocate required memory"), "{stderr}");
    assert!(stderr.contains("Exiting."), "{stderr}");
}

#[test]
fn growth_failure_aborts() {
    if in_child() {
        let backend = CountingAlloc::failing_after(1);
        let mut list = aborting_list(&backend);
        for i in 0..4 {
            let _ = list.append(i);
        }
        std::process::exit(0);
    }
    let stderr = run_child("growth_failure_aborts");
    assert!(stderr.contains("could not allocate required memory"), "{stderr}");
}

#[test]
fn capacity_overflow_aborts() {
    if in_child() {
        let backend = CountingAlloc::new();
        let mut list = aborting_list(&backend);
        let _ = list.append(1);
        let _ = list.change_capacity(usize::MAX / 4);
        std::process::exit(0);
    }
    let stderr = run_child("capacity_overflow_aborts");
    assert!(stderr.contains("clist-alloc: allocation size overflow"), "{stderr}");
    assert!(stderr.contains("Exiting."), "{stderr}");
}

#[test]
fn propagate_policy_does_not_abort() {
    let backend = CountingAlloc::failing_after(1);
    let mut list =
        CompactList::with_config(&backend, AllocConfig::default(), ListConfig::default()).unwrap();
    for i in 0..3u64 {
        list.append(i).unwrap();
    }
    assert!(list.append(3).is_err());
    assert_eq!(list.len(), 3);
}
