//! Pending operations
//!
//! The in-memory staging buffer of a StorageAdapter.

use std::collections::btree_map;
use std::collections::BTreeMap;

/// A staged mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOperation {
    /// Replace or create the entry for a key
    Update(String),

    /// Remove the entry for a key
    Delete,

    /// Wipe the whole store
    Clear,
}

/// Staged mutations, keyed by key text
///
/// The wipe marker is held apart from the per-key map, so no key can
/// collide with it. Per-key operations are kept in a BTreeMap and applied
/// in sorted key order.
#[derive(Debug, Default, Clone)]
pub struct PendingSet {
    /// Per-key operations (Update or Delete only)
    ops: BTreeMap<String, PendingOperation>,

    /// Store-wide wipe staged
    clear: bool,
}

impl PendingSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an update; replaces any earlier op for the key
    pub fn stage_update(&mut self, key: String, value: String) {
        self.ops.insert(key, PendingOperation::Update(value));
    }

    /// Stage a delete; replaces any earlier op for the key
    pub fn stage_delete(&mut self, key: String) {
        self.ops.insert(key, PendingOperation::Delete);
    }

    /// Drop all per-key ops and stage the wipe marker
    pub fn stage_clear(&mut self) {
        self.ops.clear();
        self.clear = true;
    }

    /// Staged op for a key, if any
    pub fn get(&self, key: &str) -> Option<&PendingOperation> {
        self.ops.get(key)
    }

    pub fn is_clear_staged(&self) -> bool {
        self.clear
    }

    /// Number of staged ops, counting the wipe marker
    pub fn len(&self) -> usize {
        self.ops.len() + usize::from(self.clear)
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && !self.clear
    }

    /// Iterate in application order: the wipe marker first, then per-key ops
    pub fn iter(&self) -> PendingIter<'_> {
        PendingIter {
            clear: self.clear,
            ops: self.ops.iter(),
        }
    }

    /// Drop the wipe marker (after it has been applied)
    pub fn clear_marker_applied(&mut self) {
        self.clear = false;
    }

    /// Discard everything
    pub fn discard(&mut self) {
        self.ops.clear();
        self.clear = false;
    }
}

static CLEAR: PendingOperation = PendingOperation::Clear;

/// Iterator over staged ops; yields `(None, Clear)` for the wipe marker
pub struct PendingIter<'a> {
    clear: bool,
    ops: btree_map::Iter<'a, String, PendingOperation>,
}

impl<'a> Iterator for PendingIter<'a> {
    type Item = (Option<&'a str>, &'a PendingOperation);

    fn next(&mut self) -> Option<Self::Item> {
        if self.clear {
            self.clear = false;
            return Some((None, &CLEAR));
        }
        self.ops.next().map(|(key, op)| (Some(key.as_str()), op))
    }
}
