//! Storage Module
//!
//! One file per key, applied from an in-memory staging buffer.
//!
//! ## Responsibilities
//! - Stage mutations in memory until commit
//! - Persist each entry as its own file, named by the key digest
//! - Verify entry integrity on every read
//! - Keep the storage path a real directory
//!
//! ## Directory Layout
//! ```text
//! {storage_dir}/
//!   ├── 2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae
//!   └── fcde2b2edba56bf408601fb721fe9b5c338d10ee429ea04fae5511b68fbf8fb9
//! ```
//!
//! ## Entry File Format
//! ```text
//! {"key":"foo","value":"bar","hash":"<hex sha256(key ‖ value)>"}
//! ```
//! A record that fails to parse, misses a field, or carries a wrong hash
//! is treated exactly like a missing file.

mod adapter;
mod directory;
mod pending;
mod record;

pub use adapter::StorageAdapter;
pub use pending::{PendingIter, PendingOperation, PendingSet};
pub use record::Entry;
