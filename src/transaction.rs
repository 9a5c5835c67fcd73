//! Scoped transactions
//!
//! A `Transaction` guards a StorageAdapter for the length of a scope:
//! the storage directory is validated on entry, and the staged operations
//! are either committed explicitly or rolled back when the guard drops.
//!
//! ```no_run
//! use stagekv::StorageAdapter;
//!
//! let mut store = StorageAdapter::new("./data");
//! let mut tx = store.begin()?;
//! tx.update("a", "1");
//! tx.commit()?;
//! # Ok::<_, stagekv::StoreError>(())
//! ```

use std::ops::{Deref, DerefMut};

use crate::error::{Result, StoreError};
use crate::storage::StorageAdapter;

/// Commit-or-rollback guard over a StorageAdapter
///
/// Dropping the guard without calling `commit` (early return, `?`, panic)
/// rolls back everything staged on the adapter.
///
/// `commit` and `rollback` consume the guard. Through a `&mut Transaction`
/// (as handed to the closure of `StorageAdapter::transaction`) they cannot
/// be called; the closure's return value ends the scope instead.
pub struct Transaction<'a> {
    adapter: &'a mut StorageAdapter,
    finished: bool,
}

impl<'a> Transaction<'a> {
    /// Apply the staged operations and end the transaction
    ///
    /// On error the staged operations are rolled back before returning.
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        let result = self.adapter.commit();
        if result.is_err() {
            self.adapter.rollback();
        }
        result
    }

    /// Discard the staged operations and end the transaction
    pub fn rollback(mut self) {
        self.finished = true;
        self.adapter.rollback();
    }
}

impl Deref for Transaction<'_> {
    type Target = StorageAdapter;

    fn deref(&self) -> &StorageAdapter {
        &*self.adapter
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut StorageAdapter {
        &mut *self.adapter
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Transaction dropped without commit, rolling back");
            self.adapter.rollback();
        }
    }
}

impl StorageAdapter {
    /// Open a transaction scope
    ///
    /// Validates and repairs the storage directory first.
    pub fn begin(&mut self) -> Result<Transaction<'_>> {
        self.prepare_directory()?;
        Ok(Transaction {
            adapter: self,
            finished: false,
        })
    }

    /// Run `f` inside a transaction
    ///
    /// Commits if `f` returns `Ok`, rolls back if it returns `Err` or
    /// panics. `f` stages operations only; it cannot end the scope itself:
    ///
    /// ```compile_fail
    /// # let mut store = stagekv::StorageAdapter::new("./data");
    /// store.transaction(|tx| {
    ///     tx.update("k", "v");
    ///     tx.commit()
    /// });
    /// ```
    pub fn transaction<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> std::result::Result<T, E>,
        E: From<StoreError>,
    {
        let mut tx = self.begin()?;
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                tx.rollback();
                Err(e)
            }
        }
    }
}
