//! Storage directory preparation
//!
//! The storage path must be a real directory. A regular file or a symlink
//! (dangling or not) sitting at the path is removed and replaced with an
//! empty directory. Symlinks are never followed: a link to a directory
//! elsewhere is unlinked, its target is left alone.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::symlink;

/// Make `path` a directory, replacing a conflicting file or symlink
pub fn prepare(path: &Path, reject_circular: bool) -> Result<()> {
    if reject_circular {
        if let Some(link) = symlink::find_circular_ancestor(path)? {
            tracing::error!(path = %path.display(), link = %link.display(), "Circular symlink in storage path");
            return Err(StoreError::CircularSymlink { path: link });
        }
    }

    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() || meta.is_file() => {
            tracing::warn!(path = %path.display(), "Replacing non-directory at storage path");
            fs::remove_file(path).map_err(|source| StoreError::PathConflict {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(_) => {}
        // Missing or unreachable; creation below reports the failure
        Err(_) => {}
    }

    if let Err(e) = fs::create_dir_all(path) {
        if !path.is_dir() {
            tracing::error!(path = %path.display(), error = %e, "Cannot create storage directory");
            return Err(StoreError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
    }

    // Anything else at the path (e.g. a device node) is still a conflict
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(StoreError::NotADirectory {
            path: path.to_path_buf(),
        }),
    }
}

/// Remove everything under `path` and recreate it empty
///
/// Removal errors are ignored; a symlink at the path is removed without
/// touching its target.
pub fn wipe(path: &Path) -> Result<()> {
    let removal = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };
    if let Err(e) = removal {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring error while wiping storage directory");
        }
    }

    fs::create_dir_all(path)?;
    Ok(())
}
