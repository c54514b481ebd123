#![forbid(unsafe_code)]

//! File discovery, parsing, and rule evaluation

pub mod evaluator;
pub mod provider;
pub mod walker;

pub use evaluator::Evaluator;
pub use walker::{discover_files, SourceFile};
