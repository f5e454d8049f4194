//! Nesting walker: depth-first CST traversal collecting struct candidates.
//!
//! Every declaration reachable from the unit's top level is visited,
//! including structs declared inside module bodies, function bodies, impl
//! blocks and plain blocks. The walker only gathers raw material (spans,
//! attribute text, field text); eligibility and exclusion are resolved by
//! the model layer.

use crate::parser::ParsedSource;
use tree_sitter::Node;

/// A struct declaration found in a source unit, with everything the model
/// layer needs to decide eligibility and the splicer needs to place a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructCandidate {
    pub name: String,
    /// `::`-joined path of enclosing module and function names, plus `name`.
    pub qualified_name: String,
    /// Visibility text of the struct, empty when private.
    pub vis: String,
    /// Outer attribute source text preceding the struct, in order.
    pub attrs: Vec<String>,
    /// Named fields in declaration order; None for tuple/unit/other shapes.
    pub fields: Option<Vec<FieldCandidate>>,
    pub has_generics: bool,
    /// Byte span of the struct item itself (attributes excluded).
    pub byte_start: usize,
    pub byte_end: usize,
    /// Leading whitespace of the struct's own line.
    pub indent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidate {
    pub name: String,
    /// Exact source text of the field's type.
    pub ty: String,
    pub attrs: Vec<String>,
}

/// Collect every struct declaration in the unit, depth first.
pub fn collect_candidates(parsed: &ParsedSource<'_>) -> Vec<StructCandidate> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    visit(parsed.root_node(), parsed.source, &mut path, &mut out);
    out
}

fn visit(node: Node<'_>, source: &str, path: &mut Vec<String>, out: &mut Vec<StructCandidate>) {
    // Outer attributes are siblings preceding the item they decorate, so a
    // single ordered pass with a pending list associates them correctly.
    let mut pending: Vec<String> = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "attribute_item" => {
                pending.push(source[child.byte_range()].to_string());
            }
            // Comments between an attribute and its item do not detach it.
            "line_comment" | "block_comment" => {}
            "struct_item" => {
                let attrs = std::mem::take(&mut pending);
                if let Some(candidate) = struct_candidate(child, source, path, attrs) {
                    out.push(candidate);
                }
                // Struct bodies cannot contain further declarations.
            }
            "mod_item" | "function_item" => {
                pending.clear();
                let segment = child
                    .child_by_field_name("name")
                    .map(|n| source[n.byte_range()].to_string());
                match segment {
                    Some(segment) => {
                        path.push(segment);
                        visit(child, source, path, out);
                        path.pop();
                    }
                    None => visit(child, source, path, out),
                }
            }
            _ => {
                pending.clear();
                visit(child, source, path, out);
            }
        }
    }
}

fn struct_candidate(
    node: Node<'_>,
    source: &str,
    path: &[String],
    attrs: Vec<String>,
) -> Option<StructCandidate> {
    let name = source[node.child_by_field_name("name")?.byte_range()].to_string();

    let qualified_name = if path.is_empty() {
        name.clone()
    } else {
        format!("{}::{}", path.join("::"), name)
    };

    let mut vis = String::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "visibility_modifier" {
            vis = source[child.byte_range()].to_string();
            break;
        }
    }

    let fields = match node.child_by_field_name("body") {
        Some(body) if body.kind() == "field_declaration_list" => {
            Some(named_fields(body, source))
        }
        _ => None,
    };

    Some(StructCandidate {
        name,
        qualified_name,
        vis,
        attrs,
        fields,
        has_generics: node.child_by_field_name("type_parameters").is_some(),
        byte_start: node.start_byte(),
        byte_end: node.end_byte(),
        indent: line_indent(source, node.start_byte()),
    })
}

fn named_fields(body: Node<'_>, source: &str) -> Vec<FieldCandidate> {
    let mut fields = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        match child.kind() {
            "attribute_item" => {
                pending.push(source[child.byte_range()].to_string());
            }
            "field_declaration" => {
                // Some grammar revisions nest field attributes inside the
                // declaration node instead of preceding it; collect both.
                let mut attrs = std::mem::take(&mut pending);
                let mut inner = child.walk();
                for part in child.children(&mut inner) {
                    if part.kind() == "attribute_item" {
                        attrs.push(source[part.byte_range()].to_string());
                    }
                }

                let (Some(name), Some(ty)) = (
                    child.child_by_field_name("name"),
                    child.child_by_field_name("type"),
                ) else {
                    continue;
                };

                fields.push(FieldCandidate {
                    name: source[name.byte_range()].to_string(),
                    ty: source[ty.byte_range()].to_string(),
                    attrs,
                });
            }
            _ => {}
        }
    }

    fields
}

/// Leading whitespace of the line containing `byte`.
fn line_indent(source: &str, byte: usize) -> String {
    let line_start = source[..byte].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..byte];
    if prefix.chars().all(|c| c.is_whitespace()) {
        prefix.to_string()
    } else {
        String::new()
    }
}
