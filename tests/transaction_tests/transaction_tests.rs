//! Tests for scoped transactions
//!
//! These tests verify:
//! - Successful scopes commit exactly once
//! - Failing scopes (error, early drop, panic) roll back
//! - Directory validation on scope entry

use std::fs;
use std::panic::{self, AssertUnwindSafe};

use stagekv::{StorageAdapter, StoreError};
use tempfile::TempDir;

#[derive(Debug)]
enum AppError {
    Store(StoreError),
    Aborted,
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

fn setup_temp_store() -> (TempDir, StorageAdapter) {
    let temp_dir = TempDir::new().unwrap();
    let store = StorageAdapter::new(temp_dir.path().join("store"));
    (temp_dir, store)
}

// =============================================================================
// Closure Form
// =============================================================================

#[test]
fn test_transaction_commits_on_ok() {
    let (_temp, mut store) = setup_temp_store();

    let out = store
        .transaction(|tx| {
            tx.update("a", "1");
            tx.update("b", "2");
            Ok::<_, StoreError>("done")
        })
        .unwrap();

    assert_eq!(out, "done");
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    assert!(!store.has_pending());
}

#[test]
fn test_transaction_rolls_back_on_err() {
    let (_temp, mut store) = setup_temp_store();
    store.update("keep", "old");
    store.commit().unwrap();

    let result = store.transaction(|tx| {
        tx.update("keep", "new");
        tx.delete("keep");
        tx.update("other", "x");
        Err::<(), _>(AppError::Aborted)
    });

    assert!(matches!(result, Err(AppError::Aborted)));
    assert!(!store.has_pending());
    assert_eq!(store.get("keep").unwrap().as_deref(), Some("old"));
    assert_eq!(store.get("other").unwrap(), None);
}

#[test]
fn test_transaction_reads_see_committed_state() {
    let (_temp, mut store) = setup_temp_store();
    store.update("k", "committed");
    store.commit().unwrap();

    store
        .transaction(|tx| {
            tx.update("k", "staged");
            assert_eq!(tx.get("k")?.as_deref(), Some("committed"));
            Ok::<_, StoreError>(())
        })
        .unwrap();

    assert_eq!(store.get("k").unwrap().as_deref(), Some("staged"));
}

#[test]
fn test_transaction_clear() {
    let (_temp, mut store) = setup_temp_store();
    store.update("a", "1");
    store.commit().unwrap();

    store
        .transaction(|tx| {
            tx.clear();
            Ok::<_, StoreError>(())
        })
        .unwrap();

    assert_eq!(store.get("a").unwrap(), None);
}

#[test]
fn test_transaction_rolls_back_on_panic() {
    let (_temp, mut store) = setup_temp_store();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        store
            .transaction(|tx| -> Result<(), StoreError> {
                tx.update("k", "v");
                panic!("boom")
            })
            .unwrap();
    }));

    assert!(result.is_err());
    assert!(!store.has_pending());
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn test_store_error_converts_into_caller_error() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, b"file").unwrap();

    // A regular file as a parent cannot be turned into a directory
    let mut store = StorageAdapter::new(blocker.join("store"));
    let result = store.transaction(|tx| {
        tx.update("k", "v");
        Ok::<_, AppError>(())
    });

    assert!(matches!(result, Err(AppError::Store(StoreError::NotADirectory { .. }))));
    assert!(!store.has_pending());
}

// =============================================================================
// Guard Form
// =============================================================================

#[test]
fn test_guard_commit() {
    let (_temp, mut store) = setup_temp_store();

    let mut tx = store.begin().unwrap();
    tx.update("k", "v");
    tx.commit().unwrap();

    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn test_guard_drop_rolls_back() {
    let (_temp, mut store) = setup_temp_store();

    {
        let mut tx = store.begin().unwrap();
        tx.update("k", "v");
    }

    assert!(!store.has_pending());
    store.commit().unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn test_guard_explicit_rollback() {
    let (_temp, mut store) = setup_temp_store();

    let mut tx = store.begin().unwrap();
    tx.update("k", "v");
    tx.rollback();

    assert!(!store.has_pending());
}

#[test]
fn test_guard_early_return_rolls_back() {
    fn stage(store: &mut StorageAdapter, fail: bool) -> Result<(), AppError> {
        let mut tx = store.begin()?;
        tx.update("k", "v");
        if fail {
            return Err(AppError::Aborted);
        }
        tx.commit()?;
        Ok(())
    }

    let (_temp, mut store) = setup_temp_store();

    assert!(matches!(stage(&mut store, true), Err(AppError::Aborted)));
    assert!(!store.has_pending());
}

#[test]
fn test_sequential_transactions_apply_once() {
    let (_temp, mut store) = setup_temp_store();

    store
        .transaction(|tx| {
            tx.update("k", "first");
            Ok::<_, StoreError>(())
        })
        .unwrap();
    store
        .transaction(|tx| {
            tx.delete("k");
            Ok::<_, StoreError>(())
        })
        .unwrap();

    assert_eq!(store.get("k").unwrap(), None);
    assert_eq!(fs::read_dir(store.storage_dir()).unwrap().count(), 0);
}

// =============================================================================
// Commit Failure
// =============================================================================

/// Block the entry path of key `b` with a directory
fn block_entry_b(store: &StorageAdapter) {
    store.prepare_directory().unwrap();
    fs::create_dir(store.entry_path("b")).unwrap();
}

#[test]
fn test_guard_commit_failure_rolls_back() {
    let (_temp, mut store) = setup_temp_store();
    block_entry_b(&store);

    let mut tx = store.begin().unwrap();
    tx.update("a", "1");
    tx.update("b", "2");
    tx.update("c", "3");
    let err = tx.commit().unwrap_err();

    assert!(matches!(err, StoreError::Commit { ref key, .. } if key == "b"));
    assert!(!store.has_pending());
    // Applied prefix stays on disk, the rest never lands
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    assert_eq!(store.get("c").unwrap(), None);
}

#[test]
fn test_transaction_commit_failure_rolls_back() {
    let (_temp, mut store) = setup_temp_store();
    block_entry_b(&store);

    let result = store.transaction(|tx| {
        tx.update("a", "1");
        tx.update("b", "2");
        tx.update("c", "3");
        Ok::<_, AppError>(())
    });

    assert!(matches!(
        result,
        Err(AppError::Store(StoreError::Commit { ref key, .. })) if key == "b"
    ));
    assert!(!store.has_pending());
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    assert_eq!(store.get("c").unwrap(), None);

    // Nothing leaks into the next scope
    fs::remove_dir(store.entry_path("b")).unwrap();
    store
        .transaction(|tx| {
            tx.update("d", "4");
            Ok::<_, StoreError>(())
        })
        .unwrap();
    assert_eq!(store.get("b").unwrap(), None);
    assert_eq!(store.get("d").unwrap().as_deref(), Some("4"));
}

// =============================================================================
// Scope Entry Directory Checks
// =============================================================================

#[test]
fn test_begin_creates_directory() {
    let (temp, mut store) = setup_temp_store();

    let tx = store.begin().unwrap();
    tx.rollback();

    assert!(temp.path().join("store").is_dir());
}

#[test]
fn test_begin_replaces_file() {
    let (temp, mut store) = setup_temp_store();
    fs::write(temp.path().join("store"), b"conflict").unwrap();

    let tx = store.begin().unwrap();
    tx.rollback();

    assert!(temp.path().join("store").is_dir());
}

#[cfg(unix)]
#[test]
fn test_begin_replaces_symlink() {
    let (temp, mut store) = setup_temp_store();
    let target = temp.path().join("target");
    fs::create_dir(&target).unwrap();
    std::os::unix::fs::symlink(&target, temp.path().join("store")).unwrap();

    store
        .transaction(|tx| {
            tx.update("k", "v");
            Ok::<_, StoreError>(())
        })
        .unwrap();

    let meta = fs::symlink_metadata(temp.path().join("store")).unwrap();
    assert!(meta.is_dir());
    assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
}
