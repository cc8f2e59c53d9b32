//! zipalign: 4-byte alignment of the rebuilt package.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::split_path;
use crate::common::remove_path_if_exists;
use crate::error::Error;
use crate::process::Cmd;

/// Prefix of the aligned copy.
pub const ALIGNED_PREFIX: &str = "aligned_";

/// Alignment in bytes.
pub const ALIGNMENT: &str = "4";

/// Write `aligned_<name>` next to `package`.
///
/// Native libraries are page-aligned too (`-p`).
pub fn align(zipalign: &Path, package: &Path) -> Result<PathBuf> {
    if !package.is_file() {
        return Err(Error::MissingOutput(package.to_path_buf()).into());
    }
    let (work_dir, file_name) = split_path(package)?;
    let aligned = work_dir.join(format!("{}{}", ALIGNED_PREFIX, file_name));
    remove_path_if_exists(&aligned).context("Removing stale aligned package")?;

    Cmd::tool(zipalign)
        .args(["-p", "-f", ALIGNMENT])
        .arg_path(package)
        .arg_path(&aligned)
        .dir(work_dir)
        .error_msg("failed to zipalign apk")
        .run()?;

    if !aligned.is_file() {
        return Err(Error::MissingOutput(aligned).into());
    }
    Ok(aligned)
}
