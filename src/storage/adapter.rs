//! Storage Adapter
//!
//! Staged writes over a directory of hash-verified entry files.
//!
//! ## Responsibilities
//! - Stage update/delete/clear in memory (no disk I/O)
//! - Apply the staged set to disk on commit
//! - Read committed, integrity-checked values
//! - Keep the storage path a real directory

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::digest::key_digest;
use crate::error::{Result, StoreError};
use crate::key::ToText;

use super::directory;
use super::{Entry, PendingOperation, PendingSet};

/// Key-value store with staged, batch-applied writes
///
/// ## Read semantics
/// `get` always returns committed disk state. A staged `Update` is not
/// visible until commit, and neither is a staged `Delete`: the entry stays
/// readable from disk until the delete is applied.
///
/// ## Ownership
/// Each adapter owns its own pending set. Two adapters over the same
/// directory are not coordinated in any way.
pub struct StorageAdapter {
    /// Adapter configuration (storage path and write options)
    config: Config,

    /// Staged mutations
    pending: PendingSet,
}

impl StorageAdapter {
    /// Create an adapter over `storage_dir` with default options
    ///
    /// No I/O happens until a read, `prepare_directory` or `commit`.
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(Config::builder().storage_dir(storage_dir).build())
    }

    /// Create an adapter from a full config
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            pending: PendingSet::new(),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get the committed value for a key
    ///
    /// Returns:
    /// - `Ok(Some(value))` — an intact entry exists on disk
    /// - `Ok(None)` — no entry, or the entry is corrupt or tampered
    pub fn get(&self, key: impl ToText) -> Result<Option<String>> {
        let key = key.to_text();

        // A staged delete is not visible before commit either: it reads
        // through to the entry still on disk, same as every other key
        if let Some(PendingOperation::Delete) = self.pending.get(&key) {
            tracing::trace!(key = %key, "Key has a staged delete, reading disk");
        }

        self.read_committed(&key)
    }

    /// Whether an intact committed entry exists for the key
    pub fn contains_key(&self, key: impl ToText) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    // =========================================================================
    // Staging
    // =========================================================================

    /// Stage an update; the last staged value for a key wins
    pub fn update(&mut self, key: impl ToText, value: impl ToText) {
        self.pending
            .stage_update(key.to_text().into_owned(), value.to_text().into_owned());
    }

    /// Stage a delete
    pub fn delete(&mut self, key: impl ToText) {
        self.pending.stage_delete(key.to_text().into_owned());
    }

    /// Discard everything staged so far and stage a store-wide wipe
    pub fn clear(&mut self) {
        self.pending.stage_clear();
    }

    /// Alias of `update`
    pub fn insert(&mut self, key: impl ToText, value: impl ToText) {
        self.update(key, value);
    }

    /// Alias of `delete`
    pub fn remove(&mut self, key: impl ToText) {
        self.delete(key);
    }

    // =========================================================================
    // Commit / Rollback
    // =========================================================================

    /// Apply all staged operations to disk
    ///
    /// Steps:
    /// 1. Wipe the directory if a clear is staged
    /// 2. Make sure the storage path is a directory
    /// 3. Write or remove one file per staged key
    /// 4. Empty the pending set
    ///
    /// If writing or removing a file fails, the error is returned and the
    /// remaining ops are skipped. Ops applied before the failure stay
    /// applied; the per-key ops stay staged, so calling `commit` again
    /// re-applies the batch.
    pub fn commit(&mut self) -> Result<()> {
        let dir = self.config.storage_dir.as_path();

        // Step 1: Store-wide wipe
        if self.pending.is_clear_staged() {
            tracing::info!(path = %dir.display(), "Clearing storage directory");
            directory::wipe(dir)?;
            self.pending.clear_marker_applied();
        }

        // Step 2: Storage path must be a directory
        directory::prepare(dir, self.config.reject_circular_symlinks)?;

        // Step 3: Per-key operations
        let mut written = 0usize;
        let mut removed = 0usize;

        for (key, op) in self.pending.iter() {
            let Some(key) = key else { continue };
            let path = self.entry_path(key);

            let applied = match op {
                PendingOperation::Update(value) => self.write_entry(&path, key, value),
                PendingOperation::Delete => remove_entry(&path),
                PendingOperation::Clear => Ok(false),
            };

            match applied {
                Ok(true) if matches!(op, PendingOperation::Update(_)) => written += 1,
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(source) => {
                    tracing::error!(
                        key = %key,
                        path = %path.display(),
                        error = %source,
                        "Error during commit operation"
                    );
                    return Err(StoreError::Commit {
                        key: key.to_string(),
                        source,
                    });
                }
            }
            tracing::debug!(key = %key, op = ?op, "Applied pending operation");
        }

        // Step 4: Done
        self.pending.discard();
        tracing::debug!(written, removed, "Commit complete");

        Ok(())
    }

    /// Discard all staged operations without touching disk
    pub fn rollback(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(discarded = self.pending.len(), "Rolling back pending operations");
        }
        self.pending.discard();
    }

    /// Validate and repair the storage path
    ///
    /// Removes a file or symlink at the path, creates the directory if
    /// missing, and fails if a non-directory cannot be replaced.
    pub fn prepare_directory(&self) -> Result<()> {
        directory::prepare(
            &self.config.storage_dir,
            self.config.reject_circular_symlinks,
        )
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the storage directory path
    pub fn storage_dir(&self) -> &Path {
        &self.config.storage_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the staged operations
    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    /// Whether anything is staged
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Path of the file holding the entry for `key`
    pub fn entry_path(&self, key: impl ToText) -> PathBuf {
        self.config.storage_dir.join(key_digest(&key.to_text()))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read_committed(&self, key: &str) -> Result<Option<String>> {
        Ok(Entry::load(&self.entry_path(key))?.map(|entry| entry.value))
    }

    /// Write a fresh record; the hash is always recomputed here
    fn write_entry(&self, path: &Path, key: &str, value: &str) -> std::io::Result<bool> {
        let bytes = Entry::new(key, value)
            .encode()
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e.to_string()))?;

        let mut file = File::create(path)?;
        file.write_all(&bytes)?;
        if self.config.sync_writes {
            file.sync_all()?;
        }
        Ok(true)
    }
}

/// Remove an entry file; a missing file is not an error
fn remove_entry(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
