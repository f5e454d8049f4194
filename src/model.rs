//! Component model extraction and exclusion resolution.
//!
//! Turns a walker candidate into an ordered component list with per-field
//! exclusion resolved, or a per-declaration error. Declaration order is
//! significant: it fixes both setter order and the reconstruction order in
//! the generated `apply`.

use crate::config::MarkersConfig;
use crate::markers;
use crate::walk::StructCandidate;
use thiserror::Error;

/// Names the generated helper reserves for its own operations.
const RESERVED_COMPONENT_NAMES: [&str; 2] = ["snapshot", "apply"];

/// One named, typed member of a value type's fixed shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    /// Exact source text of the component's type.
    pub ty: String,
    /// True when the component carries the exclusion marker; it then keeps
    /// its place in snapshot and reconstruction but gets no setter.
    pub excluded: bool,
}

/// An eligible value-type declaration, ready for shape derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDecl {
    pub name: String,
    pub qualified_name: String,
    pub vis: String,
    /// Components in declaration order.
    pub components: Vec<Component>,
    /// End byte of the struct item; a fresh region is inserted here.
    pub insert_after: usize,
    pub indent: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("declaration `{name}` is marked for generation but has no components")]
    NoComponents { name: String },

    #[error("declaration `{name}` repeats component name `{component}`")]
    DuplicateComponent { name: String, component: String },

    #[error("component `{component}` of `{name}` collides with a generated helper operation")]
    ReservedComponentName { name: String, component: String },

    #[error("declaration `{name}` has generic parameters, which the generated helper cannot carry")]
    GenericParameters { name: String },
}

/// Outcome of inspecting one walker candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// No generation marker; the declaration is passed over untouched.
    Ineligible,
    /// Marked, but not a fixed-shape aggregate with named fields. The
    /// marker is ignored on such declarations.
    NotRecord,
    Record(RecordDecl),
    Malformed(ModelError),
}

/// Resolve a candidate against the configured markers.
pub fn extract(candidate: &StructCandidate, config: &MarkersConfig) -> Extraction {
    let marked = candidate
        .attrs
        .iter()
        .any(|attr| markers::is_generation_marker(attr, config));
    if !marked {
        return Extraction::Ineligible;
    }

    let Some(fields) = &candidate.fields else {
        return Extraction::NotRecord;
    };

    if candidate.has_generics {
        return Extraction::Malformed(ModelError::GenericParameters {
            name: candidate.qualified_name.clone(),
        });
    }

    if fields.is_empty() {
        return Extraction::Malformed(ModelError::NoComponents {
            name: candidate.qualified_name.clone(),
        });
    }

    let mut components = Vec::with_capacity(fields.len());
    for field in fields {
        if components.iter().any(|c: &Component| c.name == field.name) {
            return Extraction::Malformed(ModelError::DuplicateComponent {
                name: candidate.qualified_name.clone(),
                component: field.name.clone(),
            });
        }
        if RESERVED_COMPONENT_NAMES.contains(&field.name.as_str()) {
            return Extraction::Malformed(ModelError::ReservedComponentName {
                name: candidate.qualified_name.clone(),
                component: field.name.clone(),
            });
        }

        components.push(Component {
            name: field.name.clone(),
            ty: field.ty.clone(),
            excluded: field
                .attrs
                .iter()
                .any(|attr| markers::is_exclusion_marker(attr, config)),
        });
    }

    Extraction::Record(RecordDecl {
        name: candidate.name.clone(),
        qualified_name: candidate.qualified_name.clone(),
        vis: candidate.vis.clone(),
        components,
        insert_after: candidate.byte_end,
        indent: candidate.indent.clone(),
    })
}
