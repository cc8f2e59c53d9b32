//! Host tool availability checks.

use std::path::Path;

use crate::config::ToolOverrides;
use crate::process;

use super::types::CheckResult;

/// An external tool the conversion shells out to.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    /// Where to get it.
    pub hint: &'static str,
}

pub const APKTOOL: ToolSpec = ToolSpec {
    name: "apktool",
    hint: "Install apktool (https://apktool.org) and make sure it is on PATH, or set APKTOOL.",
};

pub const ZIPALIGN: ToolSpec = ToolSpec {
    name: "zipalign",
    hint: "Install the Android SDK build-tools and add them to PATH, or set ZIPALIGN.",
};

pub const APKSIGNER: ToolSpec = ToolSpec {
    name: "apksigner",
    hint: "Install the Android SDK build-tools and add them to PATH, or set APKSIGNER.",
};

/// Check one tool, preferring an explicit override over PATH.
pub fn check_tool(spec: ToolSpec, overrides: &ToolOverrides) -> CheckResult {
    match overrides.get(spec.name) {
        Some(path) => check_override(spec, path),
        None => match process::which(spec.name) {
            Some(path) => CheckResult::found(spec.name, path),
            None => CheckResult::fail(spec.name, &format!("Not found in PATH. {}", spec.hint)),
        },
    }
}

fn check_override(spec: ToolSpec, path: &Path) -> CheckResult {
    if path.is_file() {
        CheckResult::found(spec.name, path.to_path_buf())
    } else {
        CheckResult::fail(
            spec.name,
            &format!("Override {} does not exist. {}", path.display(), spec.hint),
        )
    }
}

/// Check the tools for a run. The signer is only required when signing.
pub fn check_host_tools(overrides: &ToolOverrides, signing: bool) -> Vec<CheckResult> {
    let mut results = vec![check_tool(APKTOOL, overrides), check_tool(ZIPALIGN, overrides)];

    if signing {
        results.push(check_tool(APKSIGNER, overrides));
    } else {
        results.push(CheckResult::skip(APKSIGNER.name, "signing disabled"));
    }

    results
}
