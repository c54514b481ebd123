#![forbid(unsafe_code)]

//! Grammar selection and parsing

use crate::types::Language;
use tree_sitter::{Parser, Tree};

/// Parses a source string with the grammar for its language.
///
/// Returns `None` when the parser produces no tree; callers surface that
/// as a parse failure for the file rather than an error for the run.
/// Syntax errors do not cause `None`: tree-sitter still yields a tree
/// with error nodes, and rules simply see fewer recognizable constructs.
pub fn parse(source: &str, language: Language) -> Option<Tree> {
    let grammar = match language {
        Language::C => tree_sitter_c::LANGUAGE,
        Language::Cpp => tree_sitter_cpp::LANGUAGE,
    };
    let mut parser = Parser::new();
    parser.set_language(&grammar.into()).ok()?;
    parser.parse(source, None)
}
