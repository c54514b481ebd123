#![forbid(unsafe_code)]

//! Human-readable output with optional color
//!
//! One header per file that has something to report, one indented line per
//! violation, then the run summary and a PASSED/FAILED verdict. Severity
//! tags are colored and positions dimmed when the sink supports it; the
//! same code path renders plain text when it does not.

use crate::report::{FileReport, RunSummary};
use crate::types::Severity;
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

/// Human-readable formatter
pub struct HumanFormatter {
    /// Suppress per-violation lines, keep summary and verdict
    pub quiet: bool,
}

impl HumanFormatter {
    pub fn new(quiet: bool) -> Self {
        HumanFormatter { quiet }
    }

    /// Writes the full report for a run
    pub fn write(
        &self,
        w: &mut dyn WriteColor,
        reports: &[FileReport],
        summary: &RunSummary,
    ) -> io::Result<()> {
        if !self.quiet {
            for report in reports {
                if report.violations.is_empty() {
                    continue;
                }
                self.write_file(w, report)?;
            }
        }
        self.write_summary(w, summary)
    }

    fn write_file(&self, w: &mut dyn WriteColor, report: &FileReport) -> io::Result<()> {
        w.set_color(ColorSpec::new().set_bold(true))?;
        write!(w, "{}", report.path.display())?;
        w.reset()?;
        writeln!(w)?;

        for v in &report.violations {
            write!(w, "  ")?;
            w.set_color(ColorSpec::new().set_dimmed(true))?;
            write!(w, "{}:{}:", v.line, v.column)?;
            w.reset()?;
            write!(w, " ")?;
            w.set_color(ColorSpec::new().set_fg(Some(severity_color(v.severity))))?;
            write!(w, "[{}]", v.severity)?;
            w.reset()?;
            writeln!(w, " {}: {}", v.rule_id, v.message)?;
        }
        writeln!(w)
    }

    fn write_summary(&self, w: &mut dyn WriteColor, summary: &RunSummary) -> io::Result<()> {
        writeln!(
            w,
            "Files: {}  Major: {}  Minor: {}  Parse failures: {}",
            summary.files, summary.major, summary.minor, summary.parse_failures
        )?;
        if summary.is_clean() {
            w.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            write!(w, "PASSED")?;
        } else {
            w.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(w, "FAILED")?;
        }
        w.reset()?;
        writeln!(w)
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Major => Color::Red,
        Severity::Minor => Color::Yellow,
    }
}
