//! Conversion pipeline.
//!
//! Runs strictly in order and stops at the first failing stage:
//! extract, classify, decompile, merge, patch manifest, delete signature
//! artifacts, recompile, align, sign (optional), emit, cleanup.
//!
//! The working directory is only removed after a successful emit. A failed
//! run leaves it in place for inspection.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::build::PackageTools;
use crate::bundle::{discover_splits, Bundle, BundleManifest, VariantSet};
use crate::common::{cleanup_work_dir, prepare_work_dir, remove_path_if_exists, sha256_file};
use crate::config::SignConfig;
use crate::error::Error;
use crate::merge::{
    delete_signature_artifacts, standaloneify, MergePlan, MergeStats, ANDROID_MANIFEST,
};
use crate::timing::Timer;

/// Working directory created next to the output.
pub const WORK_DIR_NAME: &str = ".xapktoapk";

/// Rebuilt package inside the working directory, before emit.
pub const TARGET_APK: &str = "target.apk";

/// A pipeline stage, used for progress and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Classify,
    Decompile,
    Merge,
    PatchManifest,
    DeleteSignatureArtifacts,
    Recompile,
    Align,
    Sign,
    Emit,
    Cleanup,
}

impl Stage {
    pub fn description(self) -> &'static str {
        match self {
            Stage::Extract => "Extracting bundle",
            Stage::Classify => "Classifying splits",
            Stage::Decompile => "Decompiling splits",
            Stage::Merge => "Merging splits into base",
            Stage::PatchManifest => "Patching manifest",
            Stage::DeleteSignatureArtifacts => "Deleting bundle signature",
            Stage::Recompile => "Rebuilding package",
            Stage::Align => "Aligning package",
            Stage::Sign => "Signing package",
            Stage::Emit => "Writing output",
            Stage::Cleanup => "Removing working directory",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub output: PathBuf,
    /// Hex SHA-256 of `output`.
    pub sha256: String,
    /// Number of splits in the bundle, base included.
    pub variants: usize,
    pub signed: bool,
    pub stats: MergeStats,
}

/// Bundle-to-package conversion driven through a [`PackageTools`].
pub struct Pipeline<T: PackageTools> {
    tools: T,
    sign: Option<SignConfig>,
    working_dir: PathBuf,
    keep_work_dir: bool,
}

impl<T: PackageTools> Pipeline<T> {
    /// `working_dir` receives both the work tree and the output package.
    /// `sign` of `None` leaves the output unsigned.
    pub fn new(tools: T, sign: Option<SignConfig>, working_dir: &Path) -> Self {
        Self {
            tools,
            sign,
            working_dir: working_dir.to_path_buf(),
            keep_work_dir: false,
        }
    }

    /// Keep the working directory after a successful run.
    pub fn keep_work_dir(mut self, keep: bool) -> Self {
        self.keep_work_dir = keep;
        self
    }

    pub fn work_dir(&self) -> PathBuf {
        self.working_dir.join(WORK_DIR_NAME)
    }

    /// Convert `bundle` into `<stem>.apk` in the working directory.
    pub fn run(&self, bundle: &Bundle) -> Result<Conversion> {
        let work_dir = self.work_dir();

        let extracted = run_stage(Stage::Extract, || {
            let work_dir = prepare_work_dir(&self.working_dir, WORK_DIR_NAME)?;
            bundle.extract(&work_dir)
        })?;
        log::debug!("Extracted {} entries into {}", extracted, work_dir.display());

        let variants = run_stage(Stage::Classify, || {
            let manifest = BundleManifest::read(&work_dir)?;
            let splits = discover_splits(&work_dir)?;
            Ok(VariantSet::classify(&work_dir, &splits, &manifest.package_name)?)
        })?;
        let total = variants.count();

        run_stage(Stage::Decompile, || {
            for (i, variant) in variants.iter().enumerate() {
                println!("  Decompiling {} of {}: {}", i + 1, total, variant.file_name);
                let dir = self.tools.decompile(&variant.archive_path)?;
                log::debug!("{} -> {}", variant.file_name, dir.display());
                if dir != variant.dir_path {
                    return Err(Error::MissingOutput(variant.dir_path.clone()).into());
                }
                fs::remove_file(&variant.archive_path).with_context(|| {
                    format!("Failed to remove {}", variant.archive_path.display())
                })?;
            }
            Ok(())
        })?;

        let main_dir = variants.main.dir_path.clone();
        let stats = run_stage(Stage::Merge, || MergePlan::new(&variants).apply())?;

        run_stage(Stage::PatchManifest, || {
            if !standaloneify(&main_dir.join(ANDROID_MANIFEST))? {
                println!("  [SKIP] No split markers in {}", ANDROID_MANIFEST);
            }
            Ok(())
        })?;

        run_stage(Stage::DeleteSignatureArtifacts, || {
            let removed = delete_signature_artifacts(&main_dir)?;
            log::debug!("Removed {} signature files", removed);
            Ok(())
        })?;

        let target = work_dir.join(TARGET_APK);
        run_stage(Stage::Recompile, || {
            let built = self.tools.recompile(&main_dir)?;
            fs::copy(&built, &target).with_context(|| {
                format!("Failed to copy {} to {}", built.display(), target.display())
            })?;
            Ok(())
        })?;

        run_stage(Stage::Align, || {
            let aligned = self.tools.align(&target)?;
            fs::rename(&aligned, &target).with_context(|| {
                format!("Failed to replace {} with {}", target.display(), aligned.display())
            })
        })?;

        match &self.sign {
            Some(sign) => run_stage(Stage::Sign, || self.tools.sign(&target, sign))?,
            None => println!("\n[SKIP] Signing disabled, output is unsigned"),
        }

        let output = self.working_dir.join(bundle.output_file_name());
        run_stage(Stage::Emit, || {
            if remove_path_if_exists(&output)? {
                println!("  [WARN] Replacing existing {}", output.display());
            }
            fs::rename(&target, &output).with_context(|| {
                format!("Failed to move {} to {}", target.display(), output.display())
            })
        })?;
        let sha256 = sha256_file(&output)?;

        if self.keep_work_dir {
            println!("\n[SKIP] Keeping {}", work_dir.display());
        } else {
            run_stage(Stage::Cleanup, || {
                cleanup_work_dir(&work_dir);
                Ok(())
            })?;
        }

        Ok(Conversion {
            output,
            sha256,
            variants: total,
            signed: self.sign.is_some(),
            stats,
        })
    }
}

/// Run one stage with progress, timing and error context.
fn run_stage<R>(stage: Stage, f: impl FnOnce() -> Result<R>) -> Result<R> {
    println!("\n{}...", stage);
    let timer = Timer::start(stage.description());
    let result = f().with_context(|| format!("{} failed", stage))?;
    timer.finish();
    Ok(result)
}
