//! Shared filesystem utilities.

pub mod files;
pub mod paths;
pub mod temp;

pub use files::{copy_dir_new, copy_file_if_absent, sha256_file, CopyOutcome};
pub use paths::{ensure_dir_exists, ensure_parent_exists, remove_path_if_exists};
pub use temp::{cleanup_work_dir, prepare_work_dir};
