#![forbid(unsafe_code)]

//! cstyle: a coding style checker for C and C++ sources
//!
//! cstyle parses each file with tree-sitter and evaluates a fixed
//! catalogue of style rules against the raw text, the syntax tree, and
//! an external clang-format check, reporting violations with stable
//! positions and severities.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod output;
pub mod report;
pub mod rules;
pub mod types;

// Re-export error types for convenient access
pub use error::{ConfigError, RegistryError, UnknownRuleError, WalkError};

// Re-export core domain types for convenient access
pub use types::{Language, RuleId, Severity};
