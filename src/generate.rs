//! Per-unit generation pipeline.
//!
//! One source unit goes through parse → walk → extract → shape → render →
//! splice as a pure text transformation. Per-declaration failures become
//! report entries and never stop siblings or nested declarations; unit
//! level failures (pre-existing syntax errors, an unterminated region,
//! output that stops parsing) skip the whole unit so nothing corrupt is
//! ever written.

use crate::config::GeneratorConfig;
use crate::model::{self, Extraction};
use crate::parser::ParserError;
use crate::pool;
use crate::region::{self, MarkerPair, RegionError, SpliceKind};
use crate::render::{self};
use crate::shape::WitherShape;
use crate::walk;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error("source unit has {count} pre-existing syntax errors")]
    SyntaxErrors { count: usize },

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("spliced output no longer parses: {message}")]
    OutputNotParseable { message: String },
}

/// Result of one generation pass over one source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the outcome decides whether the unit must be rewritten"]
pub enum UnitOutcome {
    /// The unit text is already exactly what generation produces.
    Unchanged,
    /// The full replacement text for the unit.
    Rewritten(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitReport {
    pub decls: Vec<DeclReport>,
    /// Regions whose owner no longer matches any eligible declaration.
    pub stale_regions: Vec<String>,
}

impl UnitReport {
    pub fn skipped(&self) -> impl Iterator<Item = &DeclReport> {
        self.decls
            .iter()
            .filter(|d| matches!(d, DeclReport::Skipped { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeclReport {
    Generated {
        owner: String,
        region: RegionStatus,
        setters: Vec<String>,
        excluded: Vec<String>,
    },
    /// A malformed or unrenderable declaration, left untouched.
    Skipped { owner: String, reason: String },
    /// A generation marker on something that is not a named-field struct.
    Ignored { owner: String, note: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStatus {
    Inserted,
    Replaced,
    Unchanged,
}

impl From<SpliceKind> for RegionStatus {
    fn from(kind: SpliceKind) -> Self {
        match kind {
            SpliceKind::Insert => RegionStatus::Inserted,
            SpliceKind::Replace => RegionStatus::Replaced,
            SpliceKind::Unchanged => RegionStatus::Unchanged,
        }
    }
}

/// Run one generation pass over a source unit's text.
pub fn generate_unit(
    source: &str,
    config: &GeneratorConfig,
) -> Result<(UnitOutcome, UnitReport), GenerateError> {
    let candidates = {
        let parsed = pool::with_parser(|p| p.parse_with_source(source))??;

        let error_count = parsed.syntax_error_count();
        if error_count > 0 {
            return Err(GenerateError::SyntaxErrors { count: error_count });
        }

        walk::collect_candidates(&parsed)
    };

    let mut report = UnitReport::default();
    let mut splices = Vec::new();
    let mut live_owners: Vec<String> = Vec::new();

    for candidate in &candidates {
        match model::extract(candidate, &config.markers) {
            Extraction::Ineligible => {}
            Extraction::NotRecord => {
                report.decls.push(DeclReport::Ignored {
                    owner: candidate.qualified_name.clone(),
                    note: "generation marker on a declaration without named fields".to_string(),
                });
            }
            Extraction::Malformed(error) => {
                report.decls.push(DeclReport::Skipped {
                    owner: candidate.qualified_name.clone(),
                    reason: error.to_string(),
                });
            }
            Extraction::Record(decl) => {
                // Same-named declarations in sibling anonymous blocks share
                // one qualified name; the first claims the region, the rest
                // are skipped so the unit keeps processing.
                if live_owners.contains(&decl.qualified_name) {
                    report.decls.push(DeclReport::Skipped {
                        owner: decl.qualified_name.clone(),
                        reason: "qualified name already claimed by an earlier declaration"
                            .to_string(),
                    });
                    continue;
                }

                let shape = WitherShape::from_decl(&decl);
                let block = match render::render_region(&shape) {
                    Ok(block) => block,
                    Err(error) => {
                        report.decls.push(DeclReport::Skipped {
                            owner: decl.qualified_name.clone(),
                            reason: error.to_string(),
                        });
                        continue;
                    }
                };

                let markers = MarkerPair::for_owner(&decl.qualified_name);
                let splice = region::plan_splice(
                    source,
                    &decl.qualified_name,
                    &markers,
                    decl.insert_after,
                    &block,
                )?;

                report.decls.push(DeclReport::Generated {
                    owner: decl.qualified_name.clone(),
                    region: splice.kind.into(),
                    setters: shape.settable().map(|c| c.name.clone()).collect(),
                    excluded: decl
                        .components
                        .iter()
                        .filter(|c| c.excluded)
                        .map(|c| c.name.clone())
                        .collect(),
                });
                live_owners.push(decl.qualified_name);
                splices.push(splice);
            }
        }
    }

    report.stale_regions = region::stale_regions(source, &live_owners);

    if splices.iter().all(|s| s.kind == SpliceKind::Unchanged) {
        return Ok((UnitOutcome::Unchanged, report));
    }

    let new_text = region::apply_splices(source, splices)?;

    // Final gate: never hand back a unit that stopped parsing.
    if let Err(e) = syn::parse_file(&new_text) {
        return Err(GenerateError::OutputNotParseable {
            message: e.to_string(),
        });
    }

    Ok((UnitOutcome::Rewritten(new_text), report))
}
