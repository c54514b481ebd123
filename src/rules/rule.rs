#![forbid(unsafe_code)]

//! Core rule types
//!
//! A [`Rule`] is a static catalogue entry: identity, severity, language
//! applicability, and a [`Check`] variant for exactly one of the five
//! evaluation domains. Check functions receive a read-only [`FileContext`]
//! and push raw [`Finding`]s; the engine attaches the rule id and severity
//! and sorts the combined result.

use crate::config::{LimitKey, Limits};
use crate::types::{Language, Severity};
use std::fmt;
use std::path::Path;
use tree_sitter::Node;

/// Read-only view of the file under evaluation
///
/// `lines` is the source split on `'\n'`, so a file ending in a newline
/// contributes a final empty element. Checks index it 0-based and report
/// 1-based line numbers.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    /// Path to the file being analyzed
    pub path: &'a Path,

    /// Language the file is evaluated as
    pub language: Language,

    /// Whether the path names a header file
    pub header: bool,

    /// Full text content of the file
    pub source: &'a str,

    /// Source split on `'\n'`
    pub lines: &'a [&'a str],

    /// Resolved numeric limits
    pub limits: Limits,
}

impl<'a> FileContext<'a> {
    /// Line content at a 0-based row, empty past the end
    pub fn line(&self, row: usize) -> &'a str {
        self.lines.get(row).copied().unwrap_or("")
    }
}

/// One raw rule hit, before the engine attaches id and severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Line number (1-indexed)
    pub line: u32,

    /// Column number (1-indexed)
    pub column: u32,

    /// Human-readable message describing the violation
    pub message: String,
}

impl Finding {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Finding {
            line,
            column,
            message: message.into(),
        }
    }

    /// Finding at the start of a line
    pub fn at_line(line: u32, message: impl Into<String>) -> Self {
        Finding::new(line, 1, message)
    }
}

/// Check function over the raw line sequence
pub type LineCheck = fn(&FileContext, &mut Vec<Finding>);

/// Check function invoked once per matching tree node
pub type NodeCheck = fn(&FileContext, Node, &mut Vec<Finding>);

/// Evaluation behavior, one variant per domain
///
/// A closed enum rather than trait objects: the engine matches the variant
/// once while building its dispatch tables, and no runtime type inspection
/// happens per node.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Scans the raw line sequence, independent of the tree
    Line(LineCheck),

    /// Scans directive-level text; same shape as `Line`, classified
    /// separately because directives are not ordinary statements
    Preproc(LineCheck),

    /// Fires once per tree node whose kind is in `kinds`
    Node {
        kinds: &'static [&'static str],
        run: NodeCheck,
    },

    /// Accumulates state across nodes, judged at frame pop or file end
    Aggregate(super::aggregate::AggregateCheck),

    /// Delegates to the external format capability, once per file
    External,
}

impl Check {
    pub fn domain(&self) -> Domain {
        match self {
            Check::Line(_) => Domain::LineScan,
            Check::Preproc(_) => Domain::Preprocessor,
            Check::Node { .. } => Domain::NodeMatch,
            Check::Aggregate(_) => Domain::Aggregate,
            Check::External => Domain::External,
        }
    }
}

/// The five evaluation domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    LineScan,
    NodeMatch,
    Aggregate,
    External,
    Preprocessor,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::LineScan => "line-scan",
            Domain::NodeMatch => "node-match",
            Domain::Aggregate => "aggregate",
            Domain::External => "external",
            Domain::Preprocessor => "preprocessor",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalogue rule definition
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Globally unique `category.name` identifier
    pub id: &'static str,

    /// One-line description for catalogue listings
    pub description: &'static str,

    /// Static severity; never computed per violation
    pub severity: Severity,

    /// Languages this rule applies to
    pub languages: &'static [Language],

    /// Configuration limit the rule compares against, if any
    pub limit: Option<LimitKey>,

    /// Evaluation behavior
    pub check: Check,
}

impl Rule {
    pub fn applies_to(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    pub fn domain(&self) -> Domain {
        self.check.domain()
    }
}
