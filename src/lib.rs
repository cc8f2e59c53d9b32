//! xapk2apk library.
//!
//! Rebuilds a single installable APK from a split `.xapk` bundle: every split
//! is decompiled, folded into the base split, and the result is rebuilt,
//! aligned and optionally signed.
//!
//! The binary in `main.rs` is a thin wrapper around [`pipeline::Pipeline`];
//! everything is exposed here for integration tests.

pub mod build;
pub mod bundle;
pub mod common;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod preflight;
pub mod process;
pub mod timing;

pub use build::{ApkTools, PackageTools, ToolPaths};
pub use bundle::{Bundle, Role, Variant, VariantSet};
pub use config::{Config, SignConfig};
pub use error::{exit_code_for, Error};
pub use pipeline::{Conversion, Pipeline, Stage};
