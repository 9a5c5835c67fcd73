//! # StageKV
//!
//! A minimal local key-value store with:
//! - One integrity-checked file per key (file name = SHA-256 of the key)
//! - Writes staged in memory and applied as a batch on explicit commit
//! - Scoped transactions that commit on success and roll back on error
//! - A symlink cycle detector for validating storage paths
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageAdapter                           │
//! │        get / update / delete / clear / commit / rollback     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ PendingSet  │          │  Directory  │
//!   │ (in memory) │─commit──▶│ {sha256}    │
//!   └─────────────┘          │ {sha256}    │
//!                            └──────┬──────┘
//!                                   │ prepare
//!                                   ▼
//!                           ┌─────────────┐
//!                           │CycleDetector│
//!                           │ (optional)  │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use stagekv::StorageAdapter;
//!
//! let mut store = StorageAdapter::new("./data");
//! store.transaction(|tx| {
//!     tx.update("greeting", "hello");
//!     tx.delete("stale");
//!     Ok::<_, stagekv::StoreError>(())
//! })?;
//! assert_eq!(store.get("greeting")?.as_deref(), Some("hello"));
//! # Ok::<_, stagekv::StoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod digest;
pub mod storage;
pub mod transaction;
pub mod symlink;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use key::ToText;
pub use storage::{Entry, PendingOperation, PendingSet, StorageAdapter};
pub use transaction::Transaction;
pub use symlink::{is_circular, SymlinkWalk, WalkOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of StageKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
