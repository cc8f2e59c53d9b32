//! External tool collaborators.
//!
//! The pipeline only talks to [`PackageTools`]; [`ApkTools`] is the real
//! implementation shelling out to apktool, zipalign and apksigner. Each call
//! blocks until the tool exits and fails on a non-zero exit code or a
//! missing output.

pub mod apksigner;
pub mod apktool;
pub mod zipalign;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::SignConfig;

/// Decompile / recompile / align / sign operations on packages.
pub trait PackageTools {
    /// Explode `package` next to itself. Returns the decompiled directory.
    fn decompile(&self, package: &Path) -> Result<PathBuf>;

    /// Rebuild a decompiled directory. Returns the built package.
    fn recompile(&self, decompiled_dir: &Path) -> Result<PathBuf>;

    /// Write an aligned copy of `package`. Returns the aligned package.
    fn align(&self, package: &Path) -> Result<PathBuf>;

    /// Sign `package` in place.
    fn sign(&self, package: &Path, sign: &SignConfig) -> Result<()>;
}

/// Resolved executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub apktool: PathBuf,
    pub zipalign: PathBuf,
    /// Only resolved when signing is enabled.
    pub apksigner: Option<PathBuf>,
}

/// [`PackageTools`] backed by the Android command-line tools.
#[derive(Debug, Clone)]
pub struct ApkTools {
    paths: ToolPaths,
}

impl ApkTools {
    pub fn new(paths: ToolPaths) -> Self {
        Self { paths }
    }
}

impl PackageTools for ApkTools {
    fn decompile(&self, package: &Path) -> Result<PathBuf> {
        apktool::decompile(&self.paths.apktool, package)
    }

    fn recompile(&self, decompiled_dir: &Path) -> Result<PathBuf> {
        apktool::build(&self.paths.apktool, decompiled_dir)
    }

    fn align(&self, package: &Path) -> Result<PathBuf> {
        zipalign::align(&self.paths.zipalign, package)
    }

    fn sign(&self, package: &Path, sign: &SignConfig) -> Result<()> {
        let apksigner = self
            .paths
            .apksigner
            .as_deref()
            .context("Signing requested but apksigner was not resolved")?;
        apksigner::sign(apksigner, package, sign)
    }
}

/// Split a package path into its directory and file name.
fn split_path(path: &Path) -> Result<(&Path, String)> {
    let dir = path
        .parent()
        .with_context(|| format!("{} has no parent directory", path.display()))?;
    let name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?
        .to_string_lossy()
        .into_owned();
    Ok((dir, name))
}
