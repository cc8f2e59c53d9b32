//! Folding a split's decompiled tree into the base tree.
//!
//! Conflicts are resolved first-writer-wins: a file already present in the
//! base is never replaced. That includes `res/drawable*` files, so the merge
//! order of density splits decides which bitmap survives.

use anyhow::{bail, Context, Result};
use std::fs;
use std::ops::AddAssign;
use std::path::Path;
use walkdir::WalkDir;

use super::exemptions::{merge_exemptions, APKTOOL_CONFIG};
use crate::common::{copy_dir_new, copy_file_if_absent, ensure_dir_exists, CopyOutcome};

/// Native libraries, one subdirectory per ABI.
pub const LIB_DIR: &str = "lib";
/// Android resources.
pub const RES_DIR: &str = "res";
/// Raw assets.
pub const ASSETS_DIR: &str = "assets";
/// Asset-pack payload inside `assets/`.
pub const ASSET_PACK_DIR: &str = "assetpack";
/// Resource ID table local to each split, never merged.
pub const VARIANT_LOCAL_RESOURCE: &str = "values/public.xml";

/// File counts for one or more merges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub copied: usize,
    /// Skipped because the base already had the file.
    pub conflicts: usize,
    /// Skipped because the file is split-local.
    pub local_skipped: usize,
}

impl AddAssign for MergeStats {
    fn add_assign(&mut self, other: Self) {
        self.copied += other.copied;
        self.conflicts += other.conflicts;
        self.local_skipped += other.local_skipped;
    }
}

/// Copy an architecture split's `lib/<abi>` directories into the base.
///
/// Each ABI directory must be new to the base. The split's compression
/// exemptions are merged afterwards.
pub fn merge_architecture(main_dir: &Path, arch_dir: &Path) -> Result<MergeStats> {
    let src_lib = arch_dir.join(LIB_DIR);
    if !src_lib.is_dir() {
        bail!("Architecture split has no {}/ directory: {}", LIB_DIR, arch_dir.display());
    }
    let dst_lib = main_dir.join(LIB_DIR);
    ensure_dir_exists(&dst_lib)?;

    let mut entries: Vec<_> = fs::read_dir(&src_lib)
        .with_context(|| format!("Failed to list {}", src_lib.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut stats = MergeStats::default();
    for entry in entries {
        let src = entry.path();
        let dst = dst_lib.join(entry.file_name());
        if dst.exists() {
            bail!("{} already exists in the base split", dst.display());
        }
        if entry.file_type()?.is_dir() {
            stats.copied += copy_dir_new(&src, &dst)?;
        } else {
            fs::copy(&src, &dst)
                .with_context(|| format!("Failed to copy {}", src.display()))?;
            stats.copied += 1;
        }
    }

    merge_exemptions(&main_dir.join(APKTOOL_CONFIG), &arch_dir.join(APKTOOL_CONFIG))?;
    Ok(stats)
}

/// Copy a split's `res/` files that the base does not have yet.
///
/// `values/public.xml` is skipped. A split without `res/` is a no-op.
pub fn merge_resources(main_dir: &Path, other_dir: &Path) -> Result<MergeStats> {
    let src = other_dir.join(RES_DIR);
    if !src.is_dir() {
        log::debug!("{} has no {}/", other_dir.display(), RES_DIR);
        return Ok(MergeStats::default());
    }
    merge_tree(&src, &main_dir.join(RES_DIR), |rel| {
        rel.ends_with(VARIANT_LOCAL_RESOURCE)
    })
}

/// Copy a split's asset pack into the base, first-writer-wins.
///
/// Only splits carrying `assets/assetpack/` contribute; for those the
/// compression exemptions are merged too.
pub fn merge_assets(main_dir: &Path, other_dir: &Path) -> Result<MergeStats> {
    let src = other_dir.join(ASSETS_DIR).join(ASSET_PACK_DIR);
    if !src.is_dir() {
        return Ok(MergeStats::default());
    }

    let stats = merge_tree(&src, &main_dir.join(ASSETS_DIR).join(ASSET_PACK_DIR), |_| false)?;
    merge_exemptions(&main_dir.join(APKTOOL_CONFIG), &other_dir.join(APKTOOL_CONFIG))?;
    Ok(stats)
}

/// Mirror `src` into `dst` without replacing anything.
///
/// `skip` receives paths relative to `src`.
fn merge_tree<F>(src: &Path, dst: &Path, skip: F) -> Result<MergeStats>
where
    F: Fn(&Path) -> bool,
{
    ensure_dir_exists(dst)?;

    let mut stats = MergeStats::default();
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let rel = entry.path().strip_prefix(src)?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            ensure_dir_exists(&target)?;
            continue;
        }
        if skip(rel) {
            log::debug!("skip split-local {}", rel.display());
            stats.local_skipped += 1;
            continue;
        }

        match copy_file_if_absent(entry.path(), &target)? {
            CopyOutcome::Copied => stats.copied += 1,
            CopyOutcome::Kept => {
                log::debug!("keep existing {}", rel.display());
                stats.conflicts += 1;
            }
        }
    }

    Ok(stats)
}
