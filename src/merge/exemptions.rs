//! Editing the `doNotCompress` block of `apktool.yml`.
//!
//! The decompiler records which paths must stay uncompressed as a list under
//! a `doNotCompress:` line:
//!
//! ```text
//! doNotCompress:
//! - arsc
//! - lib/arm64-v8a/libfoo.so
//! isFrameworkApk: false
//! ```
//!
//! The block is edited as text so every other line survives byte-for-byte.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::error::Error;

/// Packaging config written by the decompiler at the root of a tree.
pub const APKTOOL_CONFIG: &str = "apktool.yml";

/// Line that opens the exemption block.
pub const BLOCK_MARKER: &str = "doNotCompress:";

/// Prefix of every list item inside the block.
pub const ITEM_PREFIX: &str = "- ";

/// Parsed packaging config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApktoolConfig {
    lines: Vec<String>,
    line_ending: &'static str,
    trailing_newline: bool,
    exemptions: Vec<String>,
    block: Option<Range<usize>>,
}

impl ApktoolConfig {
    /// Parse config text.
    ///
    /// The block opens on the first line starting with [`BLOCK_MARKER`] and
    /// closes at the first following line that is not a list item, or at end
    /// of input. Exemptions are kept as whole lines, sorted. The terminator of
    /// the first line (`\r\n` or `\n`) is used for every line on render.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();

        let mut exemptions = Vec::new();
        let mut start = None;
        let mut block = None;

        for (index, line) in lines.iter().enumerate() {
            match start {
                None if line.starts_with(BLOCK_MARKER) => start = Some(index + 1),
                None => {}
                Some(_) if line.starts_with(ITEM_PREFIX) => exemptions.push(line.clone()),
                Some(first) => {
                    block = Some(first..index);
                    break;
                }
            }
        }
        if block.is_none() {
            block = start.map(|first| first..lines.len());
        }

        exemptions.sort();

        let line_ending = match text.find('\n') {
            Some(end) if text[..end].ends_with('\r') => "\r\n",
            _ => "\n",
        };

        Self {
            line_ending,
            trailing_newline: text.ends_with('\n'),
            lines,
            exemptions,
            block,
        }
    }

    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// All lines, without terminators.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Exemption lines (including the `- ` prefix), sorted.
    pub fn exemptions(&self) -> &[String] {
        &self.exemptions
    }

    /// Line range of the list items, `None` if there is no block.
    pub fn block(&self) -> Option<Range<usize>> {
        self.block.clone()
    }

    /// Replace the block contents with `items`, sorted and deduplicated.
    ///
    /// Returns `false` and leaves the config untouched if there is no block.
    pub fn set_exemptions<I>(&mut self, items: I) -> bool
    where
        I: IntoIterator<Item = String>,
    {
        let Some(range) = self.block.clone() else {
            return false;
        };

        let items: Vec<String> = items.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let end = range.start + items.len();
        self.lines.splice(range.clone(), items.iter().cloned());
        self.block = Some(range.start..end);
        self.exemptions = items;
        true
    }

    /// Line terminator detected on parse.
    pub fn line_ending(&self) -> &'static str {
        self.line_ending
    }

    /// Render back to text, keeping the original terminators.
    pub fn render(&self) -> String {
        let mut text = self.lines.join(self.line_ending);
        if self.trailing_newline {
            text.push_str(self.line_ending);
        }
        text
    }
}

/// Read the exemption block of a config file.
pub fn read_exemptions(config_path: &Path) -> Result<ApktoolConfig> {
    ApktoolConfig::read(config_path)
}

/// Replace the exemption block of `config_path` with `items`.
///
/// A config without a `doNotCompress:` block cannot be edited and is an error.
pub fn write_exemptions<I>(config_path: &Path, items: I) -> Result<()>
where
    I: IntoIterator<Item = String>,
{
    let mut config = ApktoolConfig::read(config_path)?;
    if !config.set_exemptions(items) {
        return Err(Error::MissingExemptionBlock(config_path.to_path_buf()).into());
    }
    fs::write(config_path, config.render())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(())
}

/// Union the exemptions of `source_path` into `target_path`.
///
/// Only the target is written. Merging the same source twice is a no-op.
pub fn merge_exemptions(target_path: &Path, source_path: &Path) -> Result<()> {
    let target = ApktoolConfig::read(target_path)?;
    let source = ApktoolConfig::read(source_path)?;

    let merged: BTreeSet<String> = target
        .exemptions()
        .iter()
        .chain(source.exemptions())
        .cloned()
        .collect();

    log::debug!(
        "doNotCompress: {} + {} -> {} entries ({})",
        target.exemptions().len(),
        source.exemptions().len(),
        merged.len(),
        target_path.display()
    );

    write_exemptions(target_path, merged)
}
