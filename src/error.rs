//! Error types for cstyle
//!
//! Per-area error enums composed at the command layer. Configuration
//! problems are fatal before any file is evaluated; per-file and per-rule
//! problems are isolated by the engine and never surface as errors here.

use std::path::PathBuf;

/// Lookup failure for a rule id absent from the registry
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown rule id '{0}'")]
pub struct UnknownRuleError(pub String);

/// Configuration-related errors
///
/// All of these abort the run before any file is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A preset name that does not exist in the preset table
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// A config layer referenced a rule id the registry does not know
    #[error("configuration error: {0}")]
    UnknownRule(#[from] UnknownRuleError),

    /// A numeric limit that is zero or negative
    #[error("limit '{key}' must be a positive integer, got {value}")]
    InvalidLimit { key: &'static str, value: i64 },

    /// Malformed TOML, including non-integral values for integer keys
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// An explicitly named config file that does not exist
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// I/O error reading a config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Catalogue validation errors raised while building the registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two rules sharing one id
    #[error("duplicate rule id '{0}'")]
    DuplicateId(String),

    /// An id that does not follow the `category.name` convention
    #[error("invalid rule id '{0}': expected lowercase 'category.name'")]
    InvalidId(String),

    /// An id colliding with a reserved diagnostic id
    #[error("rule id '{0}' collides with a reserved diagnostic id")]
    ReservedId(String),
}

/// File discovery errors
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    /// Error from the directory walker
    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// I/O error while inspecting a path
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
