#![forbid(unsafe_code)]

//! Per-file reports and the run summary
//!
//! Violations are created during evaluation, collected into one
//! [`FileReport`] per file, and folded into a [`RunSummary`] that decides
//! the process exit code.

use crate::types::{Language, RuleId, Severity};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Exit code when every file parsed and produced zero violations
pub const EXIT_CLEAN: i32 = 0;

/// Exit code for any violation, parse failure, zero matched files,
/// or configuration error
pub const EXIT_FAILURE: i32 = 1;

/// Reserved diagnostic id for files the tree provider could not parse
pub const PARSE_FAILURE_ID: &str = "internal.parse";

/// Reserved diagnostic id for rules that panicked during evaluation
pub const RULE_FAULT_ID: &str = "internal.fault";

static PARSE_FAILURE_RULE_ID: LazyLock<RuleId> =
    LazyLock::new(|| RuleId::new(PARSE_FAILURE_ID).expect("reserved id is well-formed"));
static RULE_FAULT_RULE_ID: LazyLock<RuleId> =
    LazyLock::new(|| RuleId::new(RULE_FAULT_ID).expect("reserved id is well-formed"));

/// Whether an id is one of the reserved diagnostic ids
///
/// Reserved ids are emitted by the engine itself. They never appear in the
/// catalogue and cannot be toggled from configuration.
pub fn is_reserved_id(id: &str) -> bool {
    id == PARSE_FAILURE_ID || id == RULE_FAULT_ID
}

/// A single style violation at a specific file location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Id of the rule that fired (or a reserved diagnostic id)
    pub rule_id: RuleId,

    /// File the violation was found in
    pub file: PathBuf,

    /// Line number (1-indexed)
    pub line: u32,

    /// Column number (1-indexed)
    pub column: u32,

    /// Static severity of the rule
    pub severity: Severity,

    /// Human-readable description of the problem
    pub message: String,
}

impl Violation {
    /// Diagnostic for a file the provider failed to parse or read
    pub fn parse_failure(file: &Path, message: impl Into<String>) -> Self {
        Violation {
            rule_id: PARSE_FAILURE_RULE_ID.clone(),
            file: file.to_path_buf(),
            line: 1,
            column: 1,
            severity: Severity::Major,
            message: message.into(),
        }
    }

    /// Diagnostic for a rule that panicked while evaluating a file
    pub fn rule_fault(rule_id: &str, file: &Path, message: impl Into<String>) -> Self {
        Violation {
            rule_id: RULE_FAULT_RULE_ID.clone(),
            file: file.to_path_buf(),
            line: 1,
            column: 1,
            severity: Severity::Major,
            message: format!("rule '{}' failed: {}", rule_id, message.into()),
        }
    }
}

/// Evaluation outcome for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// File that was evaluated
    pub path: PathBuf,

    /// Language the file was evaluated as
    pub language: Language,

    /// Violations sorted by (line, column, rule id)
    pub violations: Vec<Violation>,

    /// False when the tree provider failed and evaluation short-circuited
    pub parse_succeeded: bool,
}

impl FileReport {
    /// Report for a file that could not be parsed
    ///
    /// Carries exactly one reserved diagnostic; no rules ran.
    pub fn parse_failure(path: &Path, language: Language, message: impl Into<String>) -> Self {
        FileReport {
            path: path.to_path_buf(),
            language,
            violations: vec![Violation::parse_failure(path, message)],
            parse_succeeded: false,
        }
    }

    /// Number of violations with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}

/// Aggregated counts across all file reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Files evaluated
    pub files: usize,

    /// Major violations across all files
    pub major: usize,

    /// Minor violations across all files
    pub minor: usize,

    /// Files the provider failed to parse
    pub parse_failures: usize,
}

impl RunSummary {
    /// Total violations of both severities
    pub fn total(&self) -> usize {
        self.major + self.minor
    }

    /// True when at least one file was evaluated, all parsed, and no rule
    /// fired at any severity
    pub fn is_clean(&self) -> bool {
        self.files > 0 && self.major == 0 && self.minor == 0 && self.parse_failures == 0
    }

    /// Process exit code derived from the counts
    ///
    /// Zero evaluated files is a usage error, never a clean pass.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            EXIT_CLEAN
        } else {
            EXIT_FAILURE
        }
    }
}

/// Folds per-file reports into the run summary
///
/// Single-threaded reduction; runs after all parallel evaluations finish.
pub fn aggregate(reports: &[FileReport]) -> RunSummary {
    let mut summary = RunSummary {
        files: reports.len(),
        ..RunSummary::default()
    };
    for report in reports {
        summary.major += report.count(Severity::Major);
        summary.minor += report.count(Severity::Minor);
        if !report.parse_succeeded {
            summary.parse_failures += 1;
        }
    }
    summary
}
