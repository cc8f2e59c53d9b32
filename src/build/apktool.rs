//! apktool: decompile splits and rebuild the merged tree.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::split_path;
use crate::error::Error;
use crate::process::Cmd;

/// Directory apktool writes rebuilt packages into.
pub const DIST_DIR: &str = "dist";

/// `apktool d -s`: decode resources, keep `classes*.dex` as-is.
///
/// The tree is written next to the package, named after its stem.
pub fn decompile(apktool: &Path, package: &Path) -> Result<PathBuf> {
    let (work_dir, file_name) = split_path(package)?;
    let stem = package
        .file_stem()
        .with_context(|| format!("{} has no file stem", package.display()))?
        .to_string_lossy()
        .into_owned();

    Cmd::tool(apktool)
        .args(["d", "-s", "-o", stem.as_str()])
        .arg(&file_name)
        .dir(work_dir)
        .error_msg(format!("failed to unpack {}", file_name))
        .run()?;

    let out = work_dir.join(&stem);
    if !out.is_dir() {
        return Err(Error::MissingOutput(out).into());
    }
    Ok(out)
}

/// `apktool b`: rebuild a decompiled tree.
///
/// Output is expected at `<dir>/dist/<dir name>.apk`.
pub fn build(apktool: &Path, decompiled_dir: &Path) -> Result<PathBuf> {
    let (work_dir, dir_name) = split_path(decompiled_dir)?;

    Cmd::tool(apktool)
        .arg("b")
        .arg(&dir_name)
        .dir(work_dir)
        .error_msg("failed to pack apk")
        .run()?;

    let built = built_package_path(decompiled_dir);
    if !built.is_file() {
        return Err(Error::MissingOutput(built).into());
    }
    Ok(built)
}

/// Where `apktool b` leaves the package for a decompiled tree.
pub fn built_package_path(decompiled_dir: &Path) -> PathBuf {
    let name = decompiled_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    decompiled_dir.join(DIST_DIR).join(format!("{}.apk", name))
}
