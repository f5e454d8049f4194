//! Wither Gen: source-level generation of copy-with-changes builders.
//!
//! For every struct carrying the generation marker (`#[wither]` by
//! default), the generator splices a companion block into the owning
//! source file: a `<Owner>Wither` staging struct with one fluent setter
//! per non-excluded field, and a `with` entry point that snapshots the
//! value, runs a caller-supplied configuration callback, and rebuilds a
//! new instance. Fields marked `#[wither(skip)]` keep their place in the
//! rebuild but get no setter.
//!
//! # Architecture
//!
//! All text mutation compiles down to a single primitive: a verified
//! byte-span [`region::Splice`]. Intelligence lives in span acquisition
//! (tree-sitter CST walk) and rendering, not in the application logic.
//! Generated text sits between literal marker comment lines and is
//! regenerated in place on every pass; hand-written text outside the
//! markers is preserved byte for byte.
//!
//! # Safety
//!
//! - Units with pre-existing syntax errors are skipped whole
//! - Splices verify their expected before-text before applying
//! - Spliced output must re-parse before it may be written
//! - Atomic file writes (tempfile + fsync + rename)
//! - Workspace boundary enforcement
//!
//! # Example
//!
//! ```no_run
//! use wither_gen::{generate_unit, GeneratorConfig, UnitOutcome};
//!
//! let source = std::fs::read_to_string("src/book.rs")?;
//! match generate_unit(&source, &GeneratorConfig::default())? {
//!     (UnitOutcome::Rewritten(text), _report) => std::fs::write("src/book.rs", text)?,
//!     (UnitOutcome::Unchanged, _report) => {}
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod generate;
pub mod markers;
pub mod model;
pub mod output;
pub mod parser;
pub mod pool;
pub mod region;
pub mod render;
pub mod safety;
pub mod shape;
pub mod walk;

// Re-exports
pub use config::{load_from_path, load_from_str, load_or_default, ConfigError, GeneratorConfig};
pub use generate::{generate_unit, DeclReport, GenerateError, RegionStatus, UnitOutcome, UnitReport};
pub use model::{Component, Extraction, ModelError, RecordDecl};
pub use output::{atomic_write, write_if_changed, OutputError};
pub use parser::{ParsedSource, ParserError, RustParser};
pub use region::{MarkerPair, RegionError, Splice, SpliceKind};
pub use render::{render_region, RenderError};
pub use safety::{SafetyError, WorkspaceGuard};
pub use shape::WitherShape;
pub use walk::{collect_candidates, FieldCandidate, StructCandidate};
