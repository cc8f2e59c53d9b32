//! Split classification.
//!
//! Every `.apk` in a bundle is one variant. Its role decides how it is folded
//! into the base split: native libraries, density resources, or locale
//! resources and asset packs.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Extension of a packaged component.
pub const APK_EXTENSION: &str = "apk";

/// File name every bundle may use for its base split.
pub const BASE_APK: &str = "base.apk";

/// Prefix shared by configuration splits (`config.<qualifier>.apk`).
pub const CONFIG_PREFIX: &str = "config";

/// Qualifier suffix identifying a density split.
pub const DENSITY_SUFFIX: &str = "dpi";

/// Qualifiers identifying an architecture split.
pub const ARCHITECTURES: &[&str] = &["arm64_v8a", "armeabi", "x86", "x86_64"];

/// Merge category of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Main,
    Architecture,
    Density,
    Locale,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Main => "main",
            Role::Architecture => "arch",
            Role::Density => "dpi",
            Role::Locale => "locale",
        };
        f.write_str(name)
    }
}

/// Classify a split by its file name.
///
/// `package` is the package identity declared by the bundle manifest.
/// A `config`-prefixed name without a qualifier token is unclassifiable.
pub fn classify(file_name: &str, package: &str) -> Result<Role, Error> {
    if file_name == BASE_APK || file_name == format!("{}.{}", package, APK_EXTENSION) {
        return Ok(Role::Main);
    }

    if !file_name.starts_with(CONFIG_PREFIX) {
        return Ok(Role::Locale);
    }

    let stem = file_stem(file_name);
    let qualifier = stem.split('.').nth(1).ok_or_else(|| Error::Unclassifiable {
        file_name: file_name.to_string(),
        reason: "config split without a qualifier".to_string(),
    })?;

    if qualifier.ends_with(DENSITY_SUFFIX) {
        Ok(Role::Density)
    } else if ARCHITECTURES.contains(&qualifier) {
        Ok(Role::Architecture)
    } else {
        Ok(Role::Locale)
    }
}

/// File name without its final extension.
fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// One split extracted from the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// e.g. `config.xxhdpi.apk`
    pub file_name: String,
    /// Absolute path of the extracted `.apk`.
    pub archive_path: PathBuf,
    /// e.g. `config.xxhdpi`
    pub dir_name: String,
    /// Where the decompiler puts the exploded tree.
    pub dir_path: PathBuf,
    pub role: Role,
}

impl Variant {
    /// Describe a split found in `work_dir`.
    pub fn new(work_dir: &Path, file_name: &str, role: Role) -> Self {
        let dir_name = file_stem(file_name).to_string();
        Self {
            file_name: file_name.to_string(),
            archive_path: work_dir.join(file_name),
            dir_path: work_dir.join(&dir_name),
            dir_name,
            role,
        }
    }
}

/// All splits of a bundle, grouped by role.
#[derive(Debug, Clone)]
pub struct VariantSet {
    pub main: Variant,
    pub architectures: Vec<Variant>,
    pub densities: Vec<Variant>,
    pub locales: Vec<Variant>,
}

impl VariantSet {
    /// Classify every split file name and check there is exactly one base.
    ///
    /// Names are processed in sorted order so grouping is deterministic.
    pub fn classify(work_dir: &Path, file_names: &[String], package: &str) -> Result<Self, Error> {
        let mut names: Vec<&String> = file_names.iter().collect();
        names.sort();

        let mut mains = Vec::new();
        let mut architectures = Vec::new();
        let mut densities = Vec::new();
        let mut locales = Vec::new();

        for name in names {
            let role = classify(name, package)?;
            log::debug!("{} -> {}", name, role);
            let variant = Variant::new(work_dir, name, role);
            match role {
                Role::Main => mains.push(variant),
                Role::Architecture => architectures.push(variant),
                Role::Density => densities.push(variant),
                Role::Locale => locales.push(variant),
            }
        }

        if mains.len() > 1 {
            return Err(Error::MultipleMainVariants(
                mains.into_iter().map(|v| v.file_name).collect(),
            ));
        }
        let main = mains.pop().ok_or_else(|| Error::NoMainVariant {
            package: package.to_string(),
        })?;

        Ok(Self {
            main,
            architectures,
            densities,
            locales,
        })
    }

    /// Every split, base first.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        std::iter::once(&self.main)
            .chain(&self.architectures)
            .chain(&self.densities)
            .chain(&self.locales)
    }

    pub fn count(&self) -> usize {
        1 + self.architectures.len() + self.densities.len() + self.locales.len()
    }
}
