#![forbid(unsafe_code)]

//! Core domain types for cstyle
//!
//! This module defines the fundamental types used throughout the checker.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::Path;

/// Languages the checker understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
}

impl Language {
    /// Detects the language from a file extension.
    ///
    /// Returns None for extensions the checker does not handle.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "c" | "h" => Some(Language::C),
            "cc" | "cpp" | "cxx" | "hh" | "hpp" | "hxx" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// Whether the path names a header file
    ///
    /// Several rules apply only to headers (include guards, `#pragma once`)
    /// or only to translation units (export counting).
    pub fn is_header(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("h" | "hh" | "hpp" | "hxx")
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::C => write!(f, "C"),
            Language::Cpp => write!(f, "C++"),
        }
    }
}

/// Violation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Major,
    Minor,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Major => write!(f, "MAJOR"),
            Severity::Minor => write!(f, "MINOR"),
        }
    }
}

/// A validated rule identifier
///
/// Rule ids are namespaced as `category.name`: two or more non-empty,
/// dot-separated segments of lowercase alphanumerics and underscores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl RuleId {
    /// Creates a new RuleId, validating the input
    ///
    /// Returns None if the input is not a valid `category.name` identifier.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let segments: Vec<&str> = id.split('.').collect();
        if segments.len() < 2 {
            return None;
        }
        for segment in &segments {
            if segment.is_empty() {
                return None;
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            {
                return None;
            }
        }
        Some(RuleId(id))
    }

    /// Returns the rule id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the category segment (everything before the first dot)
    pub fn category(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for RuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RuleId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RuleId::new(value.clone()).ok_or_else(|| format!("invalid rule id '{value}'"))
    }
}

impl From<RuleId> for String {
    fn from(rule_id: RuleId) -> Self {
        rule_id.0
    }
}
