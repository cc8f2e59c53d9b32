//! Configuration management for xapk2apk.
//!
//! Two sources:
//! - Environment (and `.env`, loaded by `main`) for tool path overrides.
//! - `xapktoapk.sign.properties` in the current or home directory for the
//!   optional signing identity.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the signing properties file.
pub const SIGN_PROPERTIES_FILE: &str = "xapktoapk.sign.properties";

pub const KEY_SIGN_ENABLED: &str = "sign.enabled";
pub const KEY_KEYSTORE_FILE: &str = "sign.keystore.file";
pub const KEY_KEYSTORE_PASSWORD: &str = "sign.keystore.password";
pub const KEY_KEY_ALIAS: &str = "sign.key.alias";
pub const KEY_KEY_PASSWORD: &str = "sign.key.password";

/// Environment variables that point at a specific tool executable.
pub const ENV_APKTOOL: &str = "APKTOOL";
pub const ENV_ZIPALIGN: &str = "ZIPALIGN";
pub const ENV_APKSIGNER: &str = "APKSIGNER";

/// Signing identity handed to the signer.
///
/// Only constructed when every field is present and the keystore is a file.
#[derive(Clone, PartialEq, Eq)]
pub struct SignConfig {
    pub keystore_file: PathBuf,
    pub keystore_password: String,
    pub key_alias: String,
    pub key_password: String,
}

impl fmt::Debug for SignConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignConfig")
            .field("keystore_file", &self.keystore_file)
            .field("keystore_password", &"<redacted>")
            .field("key_alias", &self.key_alias)
            .field("key_password", &"<redacted>")
            .finish()
    }
}

impl SignConfig {
    /// Locate and load the signing properties.
    ///
    /// Looks in `cwd` first, then `home`. Returns `None` when no file exists
    /// or the file does not describe a complete, enabled identity.
    pub fn load(cwd: &Path, home: Option<&Path>) -> Option<Self> {
        let path = find_properties_file(cwd, home)?;
        log::debug!("Reading sign properties from {}", path.display());

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Cannot read {}: {}", path.display(), e);
                return None;
            }
        };

        let config = Self::from_properties(&parse_properties(&content));
        if config.is_none() {
            log::info!(
                "{} present but signing is disabled or incomplete",
                path.display()
            );
        }
        config
    }

    /// Build a config from parsed properties.
    pub fn from_properties(props: &HashMap<String, String>) -> Option<Self> {
        let enabled = props
            .get(KEY_SIGN_ENABLED)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        if !enabled {
            return None;
        }

        let non_empty = |key: &str| props.get(key).filter(|v| !v.is_empty()).cloned();

        let keystore_file = PathBuf::from(non_empty(KEY_KEYSTORE_FILE)?);
        if !keystore_file.is_file() {
            log::warn!(
                "Keystore {} does not exist or is not a file",
                keystore_file.display()
            );
            return None;
        }

        Some(Self {
            keystore_file,
            keystore_password: non_empty(KEY_KEYSTORE_PASSWORD)?,
            key_alias: non_empty(KEY_KEY_ALIAS)?,
            key_password: non_empty(KEY_KEY_PASSWORD)?,
        })
    }
}

fn find_properties_file(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    std::iter::once(cwd)
        .chain(home)
        .map(|dir| dir.join(SIGN_PROPERTIES_FILE))
        .find(|path| path.is_file())
}

/// Parse `key=value` lines. Blank lines and `#` comments are skipped.
pub fn parse_properties(content: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            props.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    props
}

/// Explicit executable paths, overriding PATH lookup.
#[derive(Debug, Clone, Default)]
pub struct ToolOverrides {
    pub apktool: Option<PathBuf>,
    pub zipalign: Option<PathBuf>,
    pub apksigner: Option<PathBuf>,
}

impl ToolOverrides {
    /// Get the override for a tool by its executable name.
    pub fn get(&self, tool: &str) -> Option<&Path> {
        match tool {
            "apktool" => self.apktool.as_deref(),
            "zipalign" => self.zipalign.as_deref(),
            "apksigner" => self.apksigner.as_deref(),
            _ => None,
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the tool was invoked from; output lands here.
    pub working_dir: PathBuf,
    pub tools: ToolOverrides,
    /// `None` means the output is left unsigned.
    pub sign: Option<SignConfig>,
}

impl Config {
    /// Load configuration for an invocation from `working_dir`.
    ///
    /// Expects `.env` to have been loaded into the environment already.
    pub fn load(working_dir: &Path) -> Self {
        let env_vars: HashMap<String, String> = std::env::vars().collect();
        let home = dirs::home_dir();
        Self::from_env(working_dir, &env_vars, home.as_deref())
    }

    /// Build configuration from an explicit environment map.
    pub fn from_env(
        working_dir: &Path,
        env_vars: &HashMap<String, String>,
        home: Option<&Path>,
    ) -> Self {
        let tool = |key: &str| {
            env_vars
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| {
                    let path = PathBuf::from(v.trim());
                    if path.is_absolute() {
                        path
                    } else {
                        working_dir.join(path)
                    }
                })
        };

        Self {
            working_dir: working_dir.to_path_buf(),
            tools: ToolOverrides {
                apktool: tool(ENV_APKTOOL),
                zipalign: tool(ENV_ZIPALIGN),
                apksigner: tool(ENV_APKSIGNER),
            },
            sign: SignConfig::load(working_dir, home),
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  Working directory: {}", self.working_dir.display());
        for tool in ["apktool", "zipalign", "apksigner"] {
            match self.tools.get(tool) {
                Some(path) => println!("  {}: {}", tool, path.display()),
                None => println!("  {}: (PATH)", tool),
            }
        }
        match &self.sign {
            Some(sign) => println!(
                "  Signing: ENABLED ({}, alias {})",
                sign.keystore_file.display(),
                sign.key_alias
            ),
            None => println!("  Signing: disabled"),
        }
    }
}
