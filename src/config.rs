//! Configuration for StageKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a StorageAdapter
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding one file per entry
    /// Internal structure:
    ///   {storage_dir}/
    ///     ├── {sha256(key1)}
    ///     └── {sha256(key2)}
    pub storage_dir: PathBuf,

    /// fsync each entry file after it is written during commit
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Path Safety
    // -------------------------------------------------------------------------
    /// Refuse to prepare the storage directory if the path or one of its
    /// ancestors is a circular symlink
    pub reject_circular_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./stagekv_data"),
            sync_writes: false,
            reject_circular_symlinks: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the storage directory
    pub fn storage_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = path.into();
        self
    }

    /// Enable or disable fsync after each entry write
    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.config.sync_writes = enabled;
        self
    }

    /// Enable or disable the circular symlink check during directory preparation
    pub fn reject_circular_symlinks(mut self, enabled: bool) -> Self {
        self.config.reject_circular_symlinks = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
