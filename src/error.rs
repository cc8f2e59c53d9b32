//! Typed failure conditions and their process exit codes.
//!
//! Most pipeline code works with `anyhow::Result` and attaches stage context.
//! The conditions below are the ones callers need to tell apart: precondition
//! failures map to distinct exit codes, everything else is a generic failure.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for a fatal pipeline failure.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for malformed command-line usage.
pub const EXIT_USAGE: i32 = 64;
/// Exit code for a missing or unusable input bundle.
pub const EXIT_NO_INPUT: i32 = 66;
/// Exit code for a required external tool that cannot be found.
pub const EXIT_UNAVAILABLE: i32 = 69;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{} is not a split bundle (expected a .xapk file)", .0.display())]
    InvalidExtension(PathBuf),

    #[error("Bundle not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Executable '{tool}' not found. {hint}")]
    MissingTool { tool: String, hint: String },

    #[error("Failed to determine split type of {file_name}: {reason}")]
    Unclassifiable { file_name: String, reason: String },

    #[error("Bundle has no base split (expected base.apk or {package}.apk)")]
    NoMainVariant { package: String },

    #[error("Bundle has more than one base split: {}", .0.join(", "))]
    MultipleMainVariants(Vec<String>),

    #[error("No doNotCompress block in {}", .0.display())]
    MissingExemptionBlock(PathBuf),

    #[error("Expected output not found: {}", .0.display())]
    MissingOutput(PathBuf),
}

impl Error {
    /// Process exit code for this condition.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArguments(_) => EXIT_USAGE,
            Error::InvalidExtension(_) | Error::MissingInput(_) => EXIT_NO_INPUT,
            Error::MissingTool { .. } => EXIT_UNAVAILABLE,
            Error::Unclassifiable { .. }
            | Error::NoMainVariant { .. }
            | Error::MultipleMainVariants(_)
            | Error::MissingExemptionBlock(_)
            | Error::MissingOutput(_) => EXIT_FAILURE,
        }
    }
}

/// Exit code for any error produced by the pipeline.
///
/// Walks the context chain so a typed error wrapped in stage context still
/// maps to its own code.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(Error::exit_code)
        .unwrap_or(EXIT_FAILURE)
}
