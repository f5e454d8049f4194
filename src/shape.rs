//! Helper shape derivation.
//!
//! A `WitherShape` is the ephemeral description of the generated helper
//! for one eligible declaration: the helper type name, the full component
//! list used by snapshot and reconstruction, and the non-excluded subset
//! that gets fluent setters.

use crate::model::{Component, RecordDecl};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitherShape {
    pub owner_name: String,
    pub qualified_name: String,
    pub vis: String,
    /// Generated helper type, `<Owner>Wither`.
    pub helper_name: String,
    /// Every component in declaration order, excluded ones included.
    pub components: Vec<Component>,
    pub insert_after: usize,
    pub indent: String,
}

impl WitherShape {
    pub fn from_decl(decl: &RecordDecl) -> Self {
        Self {
            owner_name: decl.name.clone(),
            qualified_name: decl.qualified_name.clone(),
            vis: decl.vis.clone(),
            helper_name: format!("{}Wither", decl.name),
            components: decl.components.clone(),
            insert_after: decl.insert_after,
            indent: decl.indent.clone(),
        }
    }

    /// Components that receive a fluent setter.
    pub fn settable(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| !c.excluded)
    }
}
