//! Preflight checks.
//!
//! Every external tool is resolved before the working directory is touched,
//! so a missing tool never leaves a half-built tree behind.

mod host_tools;
mod types;

use anyhow::Result;

use crate::build::ToolPaths;
use crate::config::ToolOverrides;
use crate::error::Error;

pub use host_tools::{check_host_tools, check_tool, ToolSpec, APKSIGNER, APKTOOL, ZIPALIGN};
pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all tool checks.
pub fn run_preflight(overrides: &ToolOverrides, signing: bool) -> PreflightReport {
    PreflightReport {
        checks: check_host_tools(overrides, signing),
    }
}

/// Turn a report into resolved tool paths.
pub fn resolve_tools(report: &PreflightReport) -> Result<ToolPaths, Error> {
    let resolve = |spec: ToolSpec| {
        report
            .get(spec.name)
            .and_then(|check| check.path.clone())
            .ok_or_else(|| Error::MissingTool {
                tool: spec.name.to_string(),
                hint: spec.hint.to_string(),
            })
    };

    let apktool = resolve(APKTOOL)?;
    let zipalign = resolve(ZIPALIGN)?;
    let apksigner = match report.get(APKSIGNER.name) {
        Some(check) if check.status == CheckStatus::Skip => None,
        _ => Some(resolve(APKSIGNER)?),
    };

    Ok(ToolPaths {
        apktool,
        zipalign,
        apksigner,
    })
}

/// Resolve every tool a run needs, or fail with the first missing one.
///
/// The report is printed only when something is missing.
pub fn run_preflight_or_fail(overrides: &ToolOverrides, signing: bool) -> Result<ToolPaths> {
    let report = run_preflight(overrides, signing);
    if !report.all_passed() {
        report.print();
    }
    for check in &report.checks {
        if let Some(path) = &check.path {
            log::debug!("{} -> {}", check.name, path.display());
        }
    }
    Ok(resolve_tools(&report)?)
}
