//! Utilities for managing the conversion work directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::paths::remove_path_if_exists;
#[cfg(windows)]
use crate::process::Cmd;

/// Prepare a work directory, removing it if it exists and creating it fresh.
///
/// A stale file with the same name is removed too. On Windows the new
/// directory is marked hidden.
///
/// # Arguments
/// * `parent_dir` - Parent directory where the work dir should be created
/// * `name` - Name of the work directory (e.g. ".xapktoapk")
///
/// # Returns
/// Path to the newly created work directory
pub fn prepare_work_dir(parent_dir: &Path, name: &str) -> Result<PathBuf> {
    let work_dir = parent_dir.join(name);

    remove_path_if_exists(&work_dir)?;
    fs::create_dir_all(&work_dir)
        .with_context(|| format!("Failed to create {}", work_dir.display()))?;
    hide(&work_dir);

    Ok(work_dir)
}

/// Set the hidden attribute. Non-fatal.
#[cfg(windows)]
fn hide(path: &Path) {
    if let Err(e) = Cmd::new("attrib").arg("+h").arg_path(path).run() {
        log::warn!("Failed to hide {}: {:#}", path.display(), e);
    }
}

/// Dot-prefixed names are already hidden.
#[cfg(not(windows))]
fn hide(_path: &Path) {}

/// Clean up a work directory after use.
///
/// Idempotent: a missing directory is not an error.
pub fn cleanup_work_dir(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
