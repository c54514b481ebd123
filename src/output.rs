//! Report rendering: human-readable text and JSONL

pub mod human;
pub mod jsonl;

pub use human::HumanFormatter;
pub use jsonl::JsonlFormatter;
