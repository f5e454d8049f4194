//! Marker-delimited region splicing.
//!
//! Pure text operations: no parser is involved. A region is the span from
//! the start marker line through the end marker line, matched literally,
//! first occurrence wins. Regeneration replaces the span in place;
//! insertion goes after the line holding the owning struct item's end.
//! Everything
//! outside a region is preserved byte for byte; everything inside is
//! generator property and is overwritten on every pass.

use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

const START_PREFIX: &str = "// region: wither ";
const START_SUFFIX: &str = " (generated; do not edit by hand)";
const END_PREFIX: &str = "// endregion: wither ";

/// The literal marker lines bracketing one owner's generated block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    pub start: String,
    pub end: String,
}

impl MarkerPair {
    pub fn for_owner(qualified_name: &str) -> Self {
        Self {
            start: format!("{START_PREFIX}{qualified_name}{START_SUFFIX}"),
            end: format!("{END_PREFIX}{qualified_name}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("start marker for `{owner}` has no matching end marker")]
    AmbiguousRegion { owner: String },

    #[error("generated regions for `{first}` and `{second}` overlap")]
    Overlap { first: String, second: String },

    #[error("region span for `{owner}` changed between planning and application")]
    SpanDrift { owner: String },
}

/// Byte span of an existing region, marker lines included (indentation of
/// the start line included, trailing newline of the end line excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSpan {
    pub byte_start: usize,
    pub byte_end: usize,
}

/// A planned byte-span replacement, verified on application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a Splice does nothing until applied"]
pub struct Splice {
    pub owner: String,
    pub byte_start: usize,
    pub byte_end: usize,
    pub text: String,
    pub kind: SpliceKind,
    /// xxh3 of the span's current text, re-checked before replacing.
    fingerprint: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceKind {
    /// No region existed; a fresh block goes after the declaration.
    Insert,
    /// An existing region is regenerated in place.
    Replace,
    /// The existing region already matches the rendered block.
    Unchanged,
}

/// Find the owner's region in `source`, if present.
///
/// Scans line by line for the start marker (trimmed comparison, so any
/// indentation matches); the first occurrence wins. A start marker with no
/// subsequent end marker is an error: the unit cannot be spliced safely.
pub fn find_region(source: &str, markers: &MarkerPair, owner: &str) -> Result<Option<RegionSpan>, RegionError> {
    let mut offset = 0;
    let mut start: Option<usize> = None;

    for line in source.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        match start {
            None => {
                if content.trim() == markers.start {
                    start = Some(offset);
                }
            }
            Some(byte_start) => {
                if content.trim() == markers.end {
                    return Ok(Some(RegionSpan {
                        byte_start,
                        byte_end: offset + content.len(),
                    }));
                }
            }
        }
        offset += line.len();
    }

    match start {
        Some(_) => Err(RegionError::AmbiguousRegion {
            owner: owner.to_string(),
        }),
        None => Ok(None),
    }
}

/// Plan the splice that brings the owner's region up to date.
///
/// `insert_after` is the byte immediately past the owning struct item; it
/// is only used when no region exists yet. A fresh block goes after the
/// end of the line containing it, so text sharing the declaration's
/// closing line (a trailing comment, a sibling item) stays on that line
/// and the end marker keeps a line of its own.
pub fn plan_splice(
    source: &str,
    owner: &str,
    markers: &MarkerPair,
    insert_after: usize,
    rendered_block: &str,
) -> Result<Splice, RegionError> {
    match find_region(source, markers, owner)? {
        Some(span) => {
            let existing = &source[span.byte_start..span.byte_end];
            let kind = if existing == rendered_block {
                SpliceKind::Unchanged
            } else {
                SpliceKind::Replace
            };
            Ok(Splice {
                owner: owner.to_string(),
                byte_start: span.byte_start,
                byte_end: span.byte_end,
                text: rendered_block.to_string(),
                kind,
                fingerprint: xxh3_64(existing.as_bytes()),
            })
        }
        None => {
            let line_end = source[insert_after..]
                .find('\n')
                .map_or(source.len(), |i| insert_after + i);
            Ok(Splice {
                owner: owner.to_string(),
                byte_start: line_end,
                byte_end: line_end,
                text: format!("\n\n{rendered_block}"),
                kind: SpliceKind::Insert,
                fingerprint: xxh3_64(b""),
            })
        }
    }
}

/// Apply planned splices bottom to top, producing the new unit text.
///
/// Splices are sorted descending by start byte so earlier spans stay
/// valid while later ones are rewritten. Overlapping spans and spans
/// whose text drifted since planning are refused.
pub fn apply_splices(source: &str, mut splices: Vec<Splice>) -> Result<String, RegionError> {
    splices.retain(|s| s.kind != SpliceKind::Unchanged);
    splices.sort_by(|a, b| b.byte_start.cmp(&a.byte_start));

    for window in splices.windows(2) {
        let (later, earlier) = (&window[0], &window[1]);
        if earlier.byte_end > later.byte_start {
            return Err(RegionError::Overlap {
                first: earlier.owner.clone(),
                second: later.owner.clone(),
            });
        }
    }

    let mut text = source.to_string();
    for splice in &splices {
        let current = &text[splice.byte_start..splice.byte_end];
        if xxh3_64(current.as_bytes()) != splice.fingerprint {
            return Err(RegionError::SpanDrift {
                owner: splice.owner.clone(),
            });
        }
        text.replace_range(splice.byte_start..splice.byte_end, &splice.text);
    }

    Ok(text)
}

/// Owners of regions present in `source` that are not in `live_owners`.
///
/// Stale regions are reported, never deleted: removing text a regeneration
/// pass did not produce is not this tool's call.
pub fn stale_regions(source: &str, live_owners: &[String]) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let content = line.trim();
            let owner = content
                .strip_prefix(START_PREFIX)?
                .strip_suffix(START_SUFFIX)?;
            (!live_owners.iter().any(|o| o == owner)).then(|| owner.to_string())
        })
        .collect()
}
