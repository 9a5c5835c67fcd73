//! SHA-256 digests
//!
//! The same algorithm serves two purposes over different inputs:
//! - `key_digest(key)` names the entry file
//! - `value_hash(key, value)` is the integrity hash stored inside it
//!
//! Text is always hashed as its UTF-8 bytes; digests are lowercase hex.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Digest of the key alone (entry file name)
pub fn key_digest(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Digest of key bytes followed by value bytes, no separator
pub fn value_hash(key: &str, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}
