//! Copy and checksum helpers.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;
use walkdir::WalkDir;

use super::paths::{ensure_dir_exists, ensure_parent_exists};

/// What happened to a single file copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// Destination already existed and was left untouched.
    Kept,
}

/// Copy `from` to `to` unless `to` already exists.
///
/// Parent directories of `to` are created as needed.
pub fn copy_file_if_absent(from: &Path, to: &Path) -> Result<CopyOutcome> {
    if to.exists() {
        return Ok(CopyOutcome::Kept);
    }
    ensure_parent_exists(to)?;
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    Ok(CopyOutcome::Copied)
}

/// Recursively copy a directory to a destination that must not exist yet.
///
/// Returns the number of files copied.
pub fn copy_dir_new(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        bail!("{} is not a directory", from.display());
    }
    if to.exists() {
        bail!("{} already exists", to.display());
    }

    let mut copied = 0;
    for entry in WalkDir::new(from) {
        let entry = entry.with_context(|| format!("Failed to walk {}", from.display()))?;
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_dir() {
            ensure_dir_exists(&dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    dest_path.display()
                )
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Hex-encoded SHA-256 of a file, read in 8KB chunks.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
