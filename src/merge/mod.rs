//! The merge engine.
//!
//! Splits are folded into the base tree in a fixed order:
//! 1. architecture splits (disjoint `lib/<abi>` trees),
//! 2. density splits, highest density first,
//! 3. locale splits, resources then asset packs.
//!
//! Because every copy is first-writer-wins, this order is what decides
//! conflicts.

pub mod exemptions;
pub mod manifest;
pub mod signature;
pub mod tree;

use anyhow::{Context, Result};
use std::path::Path;

use crate::bundle::{prioritize, Role, Variant, VariantSet};

pub use exemptions::{merge_exemptions, read_exemptions, write_exemptions, ApktoolConfig};
pub use manifest::{standaloneify, ANDROID_MANIFEST};
pub use signature::delete_signature_artifacts;
pub use tree::{merge_architecture, merge_assets, merge_resources, MergeStats};

/// Ordered merge of every split into the base.
#[derive(Debug, Clone)]
pub struct MergePlan {
    main: Variant,
    steps: Vec<Variant>,
}

impl MergePlan {
    pub fn new(variants: &VariantSet) -> Self {
        let steps = variants
            .architectures
            .iter()
            .cloned()
            .chain(prioritize(variants.densities.clone()))
            .chain(variants.locales.iter().cloned())
            .collect();

        Self {
            main: variants.main.clone(),
            steps,
        }
    }

    /// Splits in merge order.
    pub fn steps(&self) -> &[Variant] {
        &self.steps
    }

    /// Run every step against the base tree.
    pub fn apply(&self) -> Result<MergeStats> {
        let mut total = MergeStats::default();
        for variant in &self.steps {
            println!("  Merging {} ({})", variant.dir_name, variant.role);
            let stats = merge_variant(&self.main.dir_path, variant).with_context(|| {
                format!(
                    "Failed to merge {} split {} into {}",
                    variant.role, variant.dir_name, self.main.dir_name
                )
            })?;
            log::debug!(
                "{}: {} copied, {} kept from base, {} split-local",
                variant.dir_name,
                stats.copied,
                stats.conflicts,
                stats.local_skipped
            );
            total += stats;
        }
        Ok(total)
    }
}

/// Fold one split into the base tree according to its role.
pub fn merge_variant(main_dir: &Path, variant: &Variant) -> Result<MergeStats> {
    match variant.role {
        Role::Main => Ok(MergeStats::default()),
        Role::Architecture => merge_architecture(main_dir, &variant.dir_path),
        Role::Density => merge_resources(main_dir, &variant.dir_path),
        Role::Locale => {
            let mut stats = merge_resources(main_dir, &variant.dir_path)?;
            stats += merge_assets(main_dir, &variant.dir_path)?;
            Ok(stats)
        }
    }
}
