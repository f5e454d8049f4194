//! Rendering of the generated region block.
//!
//! Produces the text spliced between the region markers: the `with` entry
//! point on the owner, the helper struct, and the helper's snapshot,
//! setters and apply. Rendering is plain text; syn gates the result so a
//! block that does not parse as Rust items is never spliced in.

use crate::region::MarkerPair;
use crate::shape::WitherShape;
use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("rendered block for `{owner}` does not parse: {message}")]
    InvalidRender { owner: String, message: String },
}

/// Render the full region block for one shape, markers included, indented
/// with the owner's indentation. Lines that would be whitespace-only stay
/// empty so the block survives trailing-whitespace lints.
pub fn render_region(shape: &WitherShape) -> Result<String, RenderError> {
    let block = render_items(shape);

    // The block must parse as a sequence of items before it may touch the
    // unit. Comments are trivia to the parser, so markers ride along.
    if let Err(e) = syn::parse_file(&block) {
        return Err(RenderError::InvalidRender {
            owner: shape.qualified_name.clone(),
            message: e.to_string(),
        });
    }

    Ok(indent_block(&block, &shape.indent))
}

fn render_items(shape: &WitherShape) -> String {
    let markers = MarkerPair::for_owner(&shape.qualified_name);
    let owner = &shape.owner_name;
    let helper = &shape.helper_name;
    let vis = if shape.vis.is_empty() {
        String::new()
    } else {
        format!("{} ", shape.vis)
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", markers.start);

    // Entry point on the owner.
    let _ = writeln!(out, "impl {owner} {{");
    let _ = writeln!(
        out,
        "    /// Returns a copy of `self` with the changes staged by `configure` applied."
    );
    let _ = writeln!(out, "    ///");
    let _ = writeln!(
        out,
        "    /// `self` is never modified; staging nothing yields a value equal to it."
    );
    let _ = writeln!(
        out,
        "    {vis}fn with(&self, configure: impl FnOnce(&mut {helper})) -> {owner} {{"
    );
    let _ = writeln!(out, "        let mut wither = {helper}::snapshot(self);");
    let _ = writeln!(out, "        configure(&mut wither);");
    let _ = writeln!(out, "        wither.apply()");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);

    // Helper struct: one field per component, excluded ones included.
    let _ = writeln!(
        out,
        "/// Staging area for building a modified copy of [`{owner}`]."
    );
    let _ = writeln!(out, "{vis}struct {helper} {{");
    for c in &shape.components {
        let _ = writeln!(out, "    {}: {},", c.name, c.ty);
    }
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);

    let _ = writeln!(out, "impl {helper} {{");

    // Snapshot constructor: copies every component from the source value.
    let _ = writeln!(out, "    fn snapshot(source: &{owner}) -> {helper} {{");
    let _ = writeln!(out, "        {helper} {{");
    for c in &shape.components {
        let _ = writeln!(out, "            {0}: source.{0}.clone(),", c.name);
    }
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "    }}");

    // Fluent setters for the non-excluded components only.
    for c in shape.settable() {
        let _ = writeln!(out);
        let _ = writeln!(out, "    /// Stages a new value for `{}`.", c.name);
        let _ = writeln!(
            out,
            "    {vis}fn {0}(&mut self, {0}: {1}) -> &mut {helper} {{",
            c.name, c.ty
        );
        let _ = writeln!(out, "        self.{0} = {0};", c.name);
        let _ = writeln!(out, "        self");
        let _ = writeln!(out, "    }}");
    }

    // Reconstruction in declaration order.
    let _ = writeln!(out);
    let _ = writeln!(out, "    fn apply(self) -> {owner} {{");
    let _ = writeln!(out, "        {owner} {{");
    for c in &shape.components {
        let _ = writeln!(out, "            {0}: self.{0},", c.name);
    }
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    let _ = write!(out, "{}", markers.end);

    out
}

fn indent_block(block: &str, indent: &str) -> String {
    if indent.is_empty() {
        return block.to_string();
    }

    let mut lines = block.lines().peekable();
    let mut out = String::new();
    while let Some(line) = lines.next() {
        if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
        if lines.peek().is_some() {
            out.push('\n');
        }
    }
    out
}
