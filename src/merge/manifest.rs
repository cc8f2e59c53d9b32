//! Turning the base split's manifest into a standalone one.
//!
//! A base split declares that it cannot be installed without its config
//! splits. Those markers are removed with exact text substitutions; a
//! manifest missing any of them is left as it is.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Decompiled manifest at the root of a tree.
pub const ANDROID_MANIFEST: &str = "AndroidManifest.xml";

/// Literal substitutions, applied in order.
pub const STANDALONE_REPLACEMENTS: &[(&str, &str)] = &[
    (r#" android:isSplitRequired="true" "#, " "),
    (
        r#"<meta-data android:name="com.android.vending.splits.required" android:value="true"/>"#,
        "",
    ),
    (
        r#"<meta-data android:name="com.android.vending.splits" android:resource="@xml/splits0"/>"#,
        "",
    ),
    (
        r#"android:value="STAMP_TYPE_DISTRIBUTION_APK""#,
        r#"android:value="STAMP_TYPE_STANDALONE_APK""#,
    ),
];

/// Apply [`STANDALONE_REPLACEMENTS`] to manifest text.
pub fn standaloneify_text(text: &str) -> String {
    STANDALONE_REPLACEMENTS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Patch a manifest file in place. Returns true if the text changed.
pub fn standaloneify(manifest_path: &Path) -> Result<bool> {
    let original = fs::read_to_string(manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let patched = standaloneify_text(&original);
    if patched == original {
        return Ok(false);
    }
    fs::write(manifest_path, patched)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
    Ok(true)
}
