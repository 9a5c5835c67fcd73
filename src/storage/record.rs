//! Entry record
//!
//! The on-disk form of a single key-value pair.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::digest::value_hash;
use crate::error::{Result, StoreError};

/// A persisted key-value pair with its integrity hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Original key text
    pub key: String,

    /// Original value text
    pub value: String,

    /// Hex SHA-256 of key ‖ value
    pub hash: String,
}

impl Entry {
    /// Build an entry, computing the hash from key and value
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        let hash = value_hash(&key, &value);
        Self { key, value, hash }
    }

    /// Whether the stored hash matches the key and value
    pub fn is_intact(&self) -> bool {
        self.hash == value_hash(&self.key, &self.value)
    }

    /// Encode as a JSON object
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode and verify an entry from raw file contents
    ///
    /// Returns `None` for anything that is not an intact record: invalid
    /// UTF-8, malformed JSON, missing or mistyped fields, hash mismatch.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let entry: Entry = match serde_json::from_slice(bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable entry record");
                return None;
            }
        };

        if !entry.is_intact() {
            tracing::debug!(key = %entry.key, "Ignoring entry with mismatched hash");
            return None;
        }

        Some(entry)
    }

    /// Load an entry file
    ///
    /// Returns:
    /// - `Ok(Some(entry))` — file exists and holds an intact record
    /// - `Ok(None)` — file missing, corrupt or tampered
    /// - `Err(_)` — any other OS error (e.g. permission denied)
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Self::decode(&bytes))
    }
}
