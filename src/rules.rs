#![forbid(unsafe_code)]

//! Rule definitions and registry

pub mod aggregate;
pub mod ast;
pub mod builtin;
pub mod line;
pub mod node;
pub mod preproc;
pub mod registry;
pub mod rule;

// Re-export core types
pub use registry::Registry;
pub use rule::{Check, Domain, FileContext, Finding, LineCheck, NodeCheck, Rule};
