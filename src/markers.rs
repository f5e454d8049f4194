//! Recognition of the generation and exclusion markers on attribute text.
//!
//! Markers are matched against the raw attribute source collected by the
//! walker, insensitive to interior whitespace. Exclusion is opt-in per
//! field; nothing is ever excluded based on its type.

use crate::config::MarkersConfig;

/// True if `attr` is the declaration-level generation marker, e.g. `#[wither]`.
pub fn is_generation_marker(attr: &str, markers: &MarkersConfig) -> bool {
    normalize(attr).as_deref() == Some(markers.attribute.as_str())
}

/// True if `attr` is the per-field exclusion marker, e.g. `#[wither(skip)]`.
pub fn is_exclusion_marker(attr: &str, markers: &MarkersConfig) -> bool {
    let expected = format!("{}({})", markers.attribute, markers.skip_argument);
    normalize(attr).as_deref() == Some(expected.as_str())
}

/// Strip the `#[...]` shell and all whitespace, leaving the attribute body.
///
/// Returns None for inner attributes (`#![...]`) and non-attribute text.
fn normalize(attr: &str) -> Option<String> {
    let body = attr
        .trim()
        .strip_prefix('#')?
        .trim_start()
        .strip_prefix('[')?
        .trim_end()
        .strip_suffix(']')?;
    Some(body.chars().filter(|c| !c.is_whitespace()).collect())
}
