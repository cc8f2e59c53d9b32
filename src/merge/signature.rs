//! Removing the bundle tool's signature files from the base tree.
//!
//! The decompiler keeps the original `META-INF` under `original/`; the
//! recompiler would copy it back into the rebuilt package, where the stale
//! signature no longer matches.

use anyhow::{Context, Result};
use std::path::Path;

use crate::common::remove_path_if_exists;

/// Signature files relative to a decompiled tree.
pub const SIGNATURE_ARTIFACTS: &[&str] = &[
    "original/META-INF/BNDLTOOL.RSA",
    "original/META-INF/BNDLTOOL.SF",
    "original/META-INF/MANIFEST.MF",
];

/// Delete whichever signature artifacts exist. Returns how many were removed.
pub fn delete_signature_artifacts(main_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for rel in SIGNATURE_ARTIFACTS {
        let path = main_dir.join(rel);
        if remove_path_if_exists(&path)
            .with_context(|| format!("Removing signature artifact {}", rel))?
        {
            log::debug!("removed {}", path.display());
            removed += 1;
        }
    }
    Ok(removed)
}
