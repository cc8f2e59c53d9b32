//! Density split ordering.
//!
//! Resource merging is first-writer-wins, so density splits are merged from
//! the highest density down. Anything outside the known list goes last.

use super::variant::Variant;

/// Known density splits, highest preference first.
pub const DENSITY_PRIORITY: &[&str] = &[
    "config.xxxhdpi",
    "config.xxhdpi",
    "config.xhdpi",
    "config.hdpi",
    "config.mdpi",
    "config.ldpi",
    "config.nodpi",
    "config.tvdpi",
];

/// Order density splits for merging.
///
/// Known directory names come first in [`DENSITY_PRIORITY`] order; the rest
/// follow in reverse lexicographic order of their directory name.
pub fn prioritize(densities: Vec<Variant>) -> Vec<Variant> {
    let (mut known, mut unknown): (Vec<Variant>, Vec<Variant>) = densities
        .into_iter()
        .partition(|v| rank(&v.dir_name).is_some());

    known.sort_by_key(|v| rank(&v.dir_name));
    unknown.sort_by(|a, b| b.dir_name.cmp(&a.dir_name));

    known.extend(unknown);
    known
}

fn rank(dir_name: &str) -> Option<usize> {
    DENSITY_PRIORITY.iter().position(|known| *known == dir_name)
}
