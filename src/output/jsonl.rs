#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line: every violation record in file and
//! position order, then a single summary record with the run totals.

use crate::report::{FileReport, RunSummary};
use crate::types::Severity;
use serde::Serialize;
use std::path::PathBuf;

/// JSONL output formatter
pub struct JsonlFormatter;

impl JsonlFormatter {
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Formats all reports as JSON Lines
    ///
    /// Violations appear in report order, which is sorted by path and then
    /// by position within each file, so output is deterministic.
    pub fn format(&self, reports: &[FileReport], summary: &RunSummary) -> String {
        let mut output = String::new();

        for report in reports {
            for violation in &report.violations {
                let record = ViolationRecord {
                    record_type: "violation",
                    rule: violation.rule_id.as_str().to_string(),
                    file: violation.file.clone(),
                    line: violation.line,
                    column: violation.column,
                    severity: violation.severity,
                    message: violation.message.clone(),
                };
                if let Ok(json) = serde_json::to_string(&record) {
                    output.push_str(&json);
                    output.push('\n');
                }
            }
        }

        let record = SummaryRecord {
            record_type: "summary",
            files: summary.files,
            major: summary.major,
            minor: summary.minor,
            parse_failures: summary.parse_failures,
            passed: summary.is_clean(),
        };
        if let Ok(json) = serde_json::to_string(&record) {
            output.push_str(&json);
            output.push('\n');
        }

        output
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Violation record for JSONL output
#[derive(Debug, Serialize)]
struct ViolationRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    rule: String,
    file: PathBuf,
    line: u32,
    column: u32,
    severity: Severity,
    message: String,
}

/// Summary record for JSONL output
#[derive(Debug, Serialize)]
struct SummaryRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    files: usize,
    major: usize,
    minor: usize,
    parse_failures: usize,
    passed: bool,
}
