//! Shared test utilities for xapk2apk tests.
#![allow(dead_code)]

use anyhow::{bail, Context, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use xapk2apk::{PackageTools, SignConfig};

/// Test environment with a temporary invocation directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Directory the tool is "run" from; bundles and outputs live here.
    pub base_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            base_dir,
        }
    }

    /// Path of a file under the base directory.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.base_dir.join(rel)
    }

    /// Write a `.xapk` built from `manifest.json` and the given splits.
    pub fn write_bundle(&self, name: &str, package: &str, splits: &[(&str, Vec<u8>)]) -> PathBuf {
        let manifest = format!(
            r#"{{"xapk_version":2,"package_name":"{}","version_code":"42","split_apks":[]}}"#,
            package
        );
        let mut entries: Vec<(String, Vec<u8>)> =
            vec![("manifest.json".to_string(), manifest.into_bytes())];
        for (file_name, apk) in splits {
            entries.push((file_name.to_string(), apk.clone()));
        }

        let path = self.path(name);
        fs::write(&path, zip_bytes(&entries)).expect("Failed to write bundle");
        path
    }
}

// =============================================================================
// Tree and archive builders
// =============================================================================

/// Write a file, creating parent directories.
pub fn write_file(path: &Path, content: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Text of an `apktool.yml` with the given `doNotCompress` items.
pub fn apktool_yml(items: &[&str]) -> String {
    let mut text = String::from("!!brut.androlib.meta.MetaInfo\napkFileName: split.apk\ncompressionType: false\ndoNotCompress:\n");
    for item in items {
        text.push_str("- ");
        text.push_str(item);
        text.push('\n');
    }
    text.push_str("isFrameworkApk: false\nsdkInfo:\n  minSdkVersion: 24\n  targetSdkVersion: 34\nversion: 2.9.3\n");
    text
}

/// Write an `apktool.yml` into a decompiled tree.
pub fn write_apktool_yml(dir: &Path, items: &[&str]) {
    write_file(&dir.join("apktool.yml"), apktool_yml(items));
}

/// Zip `entries` into memory with stored compression.
pub fn zip_bytes(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer
            .start_file(name.as_str(), options)
            .expect("Failed to start zip entry");
        writer.write_all(data).expect("Failed to write zip entry");
    }
    writer
        .finish()
        .expect("Failed to finish zip")
        .into_inner()
}

/// Build a split package from `(path, content)` pairs.
pub fn split_apk(files: &[(&str, &str)]) -> Vec<u8> {
    let entries: Vec<(String, Vec<u8>)> = files
        .iter()
        .map(|(name, content)| (name.to_string(), content.as_bytes().to_vec()))
        .collect();
    zip_bytes(&entries)
}

/// Zip a directory tree, skipping the top-level `skip` directory.
pub fn zip_dir(src: &Path, dest: &Path, skip: &str) -> Result<()> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src)?;
        if rel.starts_with(skip) || !entry.file_type().is_file() {
            continue;
        }
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        entries.push((name, fs::read(entry.path())?));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, zip_bytes(&entries))?;
    Ok(())
}

/// Unpack a zip into `dest`.
pub fn unzip(archive: &Path, dest: &Path) -> Result<()> {
    let mut zip = ZipArchive::new(fs::File::open(archive)?)?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(rel) = entry.enclosed_name() else {
            bail!("unsafe entry {}", entry.name());
        };
        let out = dest.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        write_file(&out, data);
    }
    Ok(())
}

/// Every file entry of a zip, by name.
pub fn zip_entries(archive: &Path) -> BTreeMap<String, String> {
    let file = fs::File::open(archive).expect("Failed to open archive");
    let mut zip = ZipArchive::new(file).expect("Not a zip archive");
    let mut entries = BTreeMap::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).expect("Failed to read entry");
        if entry.is_dir() {
            continue;
        }
        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .expect("Entry is not text");
        entries.insert(entry.name().to_string(), content);
    }
    entries
}

// =============================================================================
// Fake package tools
// =============================================================================

/// [`PackageTools`] that treats packages as plain zips.
///
/// Decompile unzips next to the package, recompile zips the tree into
/// `dist/`, align copies, and sign only records the call.
#[derive(Clone, Default)]
pub struct FakeTools {
    /// Operations performed, e.g. `decompile base.apk`.
    pub calls: Rc<RefCell<Vec<String>>>,
    /// Operation name that fails instead of running.
    pub fail_on: Option<&'static str>,
    /// Appended to the decompiled directory name when set.
    pub decompile_suffix: Option<&'static str>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(op: &'static str) -> Self {
        Self {
            fail_on: Some(op),
            ..Self::default()
        }
    }

    pub fn decompiling_into(suffix: &'static str) -> Self {
        Self {
            decompile_suffix: Some(suffix),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, op: &str, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.borrow_mut().push(format!("{} {}", op, name));
        if self.fail_on == Some(op) {
            bail!("{} exploded on {}", op, name);
        }
        Ok(())
    }
}

impl PackageTools for FakeTools {
    fn decompile(&self, package: &Path) -> Result<PathBuf> {
        self.record("decompile", package)?;
        let mut dir = package.with_extension("").into_os_string();
        if let Some(suffix) = self.decompile_suffix {
            dir.push(suffix);
        }
        let dir = PathBuf::from(dir);
        unzip(package, &dir).with_context(|| format!("unzip {}", package.display()))?;
        Ok(dir)
    }

    fn recompile(&self, decompiled_dir: &Path) -> Result<PathBuf> {
        self.record("recompile", decompiled_dir)?;
        let name = decompiled_dir
            .file_name()
            .context("no dir name")?
            .to_string_lossy()
            .into_owned();
        let out = decompiled_dir.join("dist").join(format!("{}.apk", name));
        zip_dir(decompiled_dir, &out, "dist")?;
        Ok(out)
    }

    fn align(&self, package: &Path) -> Result<PathBuf> {
        self.record("align", package)?;
        let name = package.file_name().context("no file name")?.to_string_lossy();
        let aligned = package.with_file_name(format!("aligned_{}", name));
        fs::copy(package, &aligned)?;
        Ok(aligned)
    }

    fn sign(&self, package: &Path, _sign: &SignConfig) -> Result<()> {
        self.record("sign", package)
    }
}

// =============================================================================
// Assertions
// =============================================================================

/// Assert that a file contains expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read file: {}", path.display()));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}

/// Assert that a file has exactly the expected content.
pub fn assert_file_eq(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read file: {}", path.display()));
    assert_eq!(content, expected, "Unexpected content in {}", path.display());
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.is_file(), "Expected file to exist: {}", path.display());
}

/// Assert that a directory exists.
pub fn assert_dir_exists(path: &Path) {
    assert!(path.is_dir(), "Expected directory to exist: {}", path.display());
}

/// Assert that nothing exists at a path.
pub fn assert_not_exists(path: &Path) {
    assert!(!path.exists(), "Expected nothing at: {}", path.display());
}
