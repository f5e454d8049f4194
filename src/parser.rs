use ast_grep_language::{LanguageExt, SupportLang};
use thiserror::Error;
use tree_sitter::{Parser, Tree};

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("failed to set Rust grammar on tree-sitter parser")]
    LanguageSet,

    #[error("failed to parse source unit")]
    ParseFailed,
}

/// Tree-sitter parser wrapper for Rust source units.
///
/// The grammar comes from ast-grep-language so its version always matches
/// the tree-sitter runtime we link against.
pub struct RustParser {
    parser: Parser,
}

impl RustParser {
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        let ts_lang = SupportLang::Rust.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| ParserError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Parse a source unit, returning the tree paired with its source text.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, ParserError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(ParserError::ParseFailed)?;
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source unit together with its CST.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Number of ERROR or missing nodes in the tree.
    ///
    /// Generation refuses units with pre-existing syntax errors: byte spans
    /// taken from a broken CST cannot be trusted for splicing.
    pub fn syntax_error_count(&self) -> usize {
        count_error_nodes(self.tree.root_node())
    }

    pub fn has_errors(&self) -> bool {
        self.syntax_error_count() > 0
    }

    /// Source text covered by a node.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }
}

fn count_error_nodes(node: tree_sitter::Node<'_>) -> usize {
    let mut count = usize::from(node.is_error() || node.is_missing());

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        count += count_error_nodes(child);
    }

    count
}
