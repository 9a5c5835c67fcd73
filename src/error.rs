//! Error types for StageKV
//!
//! Provides a unified error type for all operations. Absence and integrity
//! failures of entries are never represented here: readers see them as
//! `Ok(None)`.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for StageKV operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Directory Errors
    // -------------------------------------------------------------------------
    #[error("Failed to remove existing path {path}: {source}")]
    PathConflict {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Path {path} exists but is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Storage path resolves through a circular symlink at {path}")]
    CircularSymlink { path: PathBuf },

    // -------------------------------------------------------------------------
    // Commit Errors
    // -------------------------------------------------------------------------
    #[error("Commit failed for key {key:?}: {source}")]
    Commit {
        key: String,
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Symlink Walk Errors
    // -------------------------------------------------------------------------
    #[error("Path {path} does not exist")]
    SymlinkNotFound { path: PathBuf },

    #[error("Path {path} is not a symbolic link")]
    NotASymlink { path: PathBuf },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// True for the symlink walk's NotFound condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::SymlinkNotFound { .. })
    }

    /// True for the symlink walk's InvalidArgument condition
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, StoreError::NotASymlink { .. })
    }
}
