//! Split bundle (`.xapk`) handling.
//!
//! A bundle is a zip holding `manifest.json` and one `.apk` per split.
//! [`Bundle::open`] validates the input path, [`Bundle::extract`] unpacks it
//! into the work directory, and [`variant`] / [`density`] decide how each
//! split is merged.

pub mod density;
pub mod variant;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::common::ensure_parent_exists;
use crate::error::Error;

pub use density::prioritize;
pub use variant::{classify, Role, Variant, VariantSet, APK_EXTENSION};

/// Extension of a split bundle.
pub const XAPK_EXTENSION: &str = "xapk";

/// Manifest document at the bundle root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// The fields of `manifest.json` the merge needs.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleManifest {
    /// Declared package identity, e.g. `com.example.app`.
    pub package_name: String,
}

impl BundleManifest {
    /// Read `manifest.json` from an extracted bundle.
    pub fn read(extracted_dir: &Path) -> Result<Self> {
        let path = extracted_dir.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read bundle manifest {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse bundle manifest {}", path.display()))
    }
}

/// A validated input bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Absolute path of the `.xapk`.
    pub path: PathBuf,
    /// File name without extension; names the output `.apk`.
    pub stem: String,
}

impl Bundle {
    /// Validate the input path.
    ///
    /// Fails with a precondition error if the extension is wrong or the file
    /// does not exist.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let has_extension = path
            .extension()
            .is_some_and(|ext| ext == OsStr::new(XAPK_EXTENSION));
        if !has_extension {
            return Err(Error::InvalidExtension(path.to_path_buf()));
        }

        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        if !path.is_file() {
            return Err(Error::MissingInput(path));
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidExtension(path.clone()))?;

        Ok(Self { path, stem })
    }

    /// File name of the rebuilt package.
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.stem, APK_EXTENSION)
    }

    /// Unpack every entry into `dest`. Returns the number of files written.
    ///
    /// Entries whose names would escape `dest` are skipped.
    pub fn extract(&self, dest: &Path) -> Result<usize> {
        let file = fs::File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let mut archive = zip::ZipArchive::new(file)
            .with_context(|| format!("Invalid or corrupt bundle: {}", self.path.display()))?;

        let mut count = 0;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .with_context(|| format!("Failed to read entry {} of bundle", i))?;

            let entry_path = match entry.enclosed_name() {
                Some(p) => p.to_path_buf(),
                None => {
                    log::warn!("Skipping unsafe bundle entry: {}", entry.name());
                    continue;
                }
            };
            let output_path = dest.join(&entry_path);

            if entry.is_dir() {
                fs::create_dir_all(&output_path)?;
            } else {
                ensure_parent_exists(&output_path)?;
                let mut outfile = fs::File::create(&output_path)
                    .with_context(|| format!("Failed to create {}", output_path.display()))?;
                io::copy(&mut entry, &mut outfile)
                    .with_context(|| format!("Failed to write {}", output_path.display()))?;
                count += 1;
            }
        }

        Ok(count)
    }
}

/// List split files at the root of an extracted bundle, sorted by name.
pub fn discover_splits(extracted_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(extracted_dir)
        .with_context(|| format!("Failed to list {}", extracted_dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(&format!(".{}", APK_EXTENSION)) {
            names.push(name);
        }
    }

    if names.is_empty() {
        bail!("No .{} splits found in bundle", APK_EXTENSION);
    }

    names.sort();
    Ok(names)
}
