//! apksigner: optional re-signing of the final package.

use anyhow::Result;
use std::path::Path;

use super::split_path;
use crate::config::SignConfig;
use crate::process::Cmd;

/// Sign `package` in place.
pub fn sign(apksigner: &Path, package: &Path, sign: &SignConfig) -> Result<()> {
    let (work_dir, _) = split_path(package)?;

    Cmd::tool(apksigner)
        .args(sign_args(sign))
        .arg_path(package)
        .dir(work_dir)
        .sensitive()
        .error_msg("failed to sign apk file")
        .run()?;

    Ok(())
}

/// Arguments preceding the package path.
pub fn sign_args(sign: &SignConfig) -> Vec<String> {
    vec![
        "sign".to_string(),
        "--ks".to_string(),
        sign.keystore_file.to_string_lossy().into_owned(),
        "--ks-pass".to_string(),
        format!("pass:{}", sign.keystore_password),
        "--ks-key-alias".to_string(),
        sign.key_alias.clone(),
        "--key-pass".to_string(),
        format!("pass:{}", sign.key_password),
    ]
}
