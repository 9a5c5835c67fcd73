//! Symlink Cycle Detection
//!
//! Walks the target chain of a symbolic link and reports whether it
//! revisits a path it has already resolved.
//!
//! ## Walk
//! ```text
//!   link ──read_link──▶ target ──resolve──▶ /abs/target
//!                                               │
//!                 seen before? ──yes──▶ Cycle   │
//!                 missing?     ──yes──▶ Dangling│
//!                 not a link?  ──yes──▶ Terminal│
//!                 otherwise: continue from /abs/target
//! ```
//!
//! Link resolution is deterministic, so a revisited resolved path proves a
//! cycle. Every hop either terminates or adds a new path to the visited
//! set, so the walk is bounded by the number of distinct paths in the chain.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, StoreError};

/// How a symlink walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// A resolved path was seen twice
    Cycle,

    /// The chain ends at a path that does not exist
    Dangling,

    /// The chain ends at a real file or directory
    Terminal,
}

/// Result of walking a symlink chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkWalk {
    /// Resolved targets in visit order; for a cycle the last hop is the
    /// revisited path
    pub hops: Vec<PathBuf>,

    pub outcome: WalkOutcome,
}

impl SymlinkWalk {
    pub fn is_circular(&self) -> bool {
        self.outcome == WalkOutcome::Cycle
    }
}

/// Whether `path` is a symlink whose chain loops back on itself
///
/// Errors:
/// - `SymlinkNotFound` if the path neither exists nor is a symlink
/// - `NotASymlink` if the path exists but is not a symlink
pub fn is_circular(path: &Path) -> Result<bool> {
    Ok(walk(path)?.is_circular())
}

/// Walk the chain starting at `path`, recording every resolved hop
pub fn walk(path: &Path) -> Result<SymlinkWalk> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {}
        Ok(_) => {
            return Err(StoreError::NotASymlink {
                path: path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StoreError::SymlinkNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    }

    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut hops = Vec::new();
    let mut current = absolute(path)?;

    loop {
        let target = fs::read_link(&current)?;
        let resolved = resolve_target(&current, &target)?;
        hops.push(resolved.clone());

        if !visited.insert(resolved.clone()) {
            tracing::debug!(path = %path.display(), hops = hops.len(), "Symlink cycle found");
            return Ok(SymlinkWalk {
                hops,
                outcome: WalkOutcome::Cycle,
            });
        }

        match fs::symlink_metadata(&resolved) {
            Ok(meta) if meta.file_type().is_symlink() => current = resolved,
            Ok(_) => {
                return Ok(SymlinkWalk {
                    hops,
                    outcome: WalkOutcome::Terminal,
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(SymlinkWalk {
                    hops,
                    outcome: WalkOutcome::Dangling,
                })
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// First circular symlink among `path` and its ancestors, if any
///
/// Components that do not exist are skipped; only existing symlinks are
/// walked.
pub fn find_circular_ancestor(path: &Path) -> Result<Option<PathBuf>> {
    let path = absolute(path)?;

    // Root first, so the outermost offending link is reported
    let mut ancestors: Vec<&Path> = path.ancestors().collect();
    ancestors.reverse();

    for candidate in ancestors {
        let is_link = match fs::symlink_metadata(candidate) {
            Ok(meta) => meta.file_type().is_symlink(),
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        if is_link && is_circular(candidate)? {
            return Ok(Some(candidate.to_path_buf()));
        }
    }

    Ok(None)
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Resolve a link target the way the OS would
///
/// A relative target is joined onto the canonical form of the link's
/// parent directory, so leading `..` segments name the directory the OS
/// reaches even when the parent was spelled through a symlink.
fn resolve_target(link: &Path, target: &Path) -> Result<PathBuf> {
    if target.is_absolute() {
        return Ok(join_target(PathBuf::new(), target));
    }

    let parent = link.parent().unwrap_or_else(|| Path::new("/"));
    Ok(join_target(fs::canonicalize(parent)?, target))
}

/// Append `target` to a canonical `base`
///
/// `.` is dropped. `..` pops a component only while everything pushed so
/// far is canonical; after the first named component of the target it is
/// kept verbatim, since that component may itself be a symlink.
fn join_target(base: PathBuf, target: &Path) -> PathBuf {
    let mut out = base;
    let mut canonical = true;

    for component in target.components() {
        match component {
            Component::CurDir => {}
            // `pop` is a no-op at the root
            Component::ParentDir if canonical => {
                out.pop();
            }
            Component::Normal(_) | Component::ParentDir => {
                canonical = false;
                out.push(component.as_os_str());
            }
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
        }
    }
    out
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
