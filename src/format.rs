#![forbid(unsafe_code)]

//! External format capability
//!
//! The format rule is the only one that shells out. It sits behind the
//! [`FormatChecker`] trait so the engine never touches a process handle
//! and tests can substitute a canned verdict. The shipped implementation
//! drives `clang-format --dry-run --Werror` against the nearest style
//! file above the checked path.

use crate::config::UpwardSearch;
use crate::types::Language;
use regex::Regex;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

static STYLE_DIAGNOSTIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*:(\d+):\d+: (?:error|warning):").expect("pattern is valid"));

/// Verdict of the format check for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The file matches the style, or no style file applies
    Compliant,

    /// This many distinct lines diverge from the style
    Nonconforming { lines: usize },

    /// The formatter could not run at all
    Unavailable { reason: String },
}

/// Capability seam for the external formatter
pub trait FormatChecker: Send + Sync {
    fn check(&self, path: &Path, language: Language) -> FormatOutcome;
}

/// `clang-format` behind the [`FormatChecker`] seam
///
/// Style discovery walks upward from the checked file: `.clang-format-c`
/// then `.clang-format` for C, `.clang-format-cxx` then `.clang-format`
/// for C++. A file with no style above it passes vacuously.
pub struct ClangFormat {
    binary: PathBuf,
    c_style: UpwardSearch,
    cpp_style: UpwardSearch,
}

impl ClangFormat {
    pub fn new() -> Self {
        ClangFormat::with_binary("clang-format")
    }

    /// Uses an explicit formatter binary instead of the PATH lookup
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        ClangFormat {
            binary: binary.into(),
            c_style: UpwardSearch::new([".clang-format-c", ".clang-format"]),
            cpp_style: UpwardSearch::new([".clang-format-cxx", ".clang-format"]),
        }
    }

    fn style_for(&self, path: &Path, language: Language) -> Option<PathBuf> {
        let dir = path.parent().unwrap_or(Path::new("."));
        match language {
            Language::C => self.c_style.find(dir),
            Language::Cpp => self.cpp_style.find(dir),
        }
    }
}

impl Default for ClangFormat {
    fn default() -> Self {
        ClangFormat::new()
    }
}

impl FormatChecker for ClangFormat {
    fn check(&self, path: &Path, language: Language) -> FormatOutcome {
        let Some(style) = self.style_for(path, language) else {
            log::debug!("no clang-format style applies to {}", path.display());
            return FormatOutcome::Compliant;
        };
        let output = Command::new(&self.binary)
            .arg(format!("--style=file:{}", style.display()))
            .arg("--dry-run")
            .arg("--Werror")
            .arg(path)
            .output();
        match output {
            Ok(output) if output.status.success() => FormatOutcome::Compliant,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                FormatOutcome::Nonconforming {
                    lines: count_nonconforming_lines(&stderr),
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => FormatOutcome::Unavailable {
                reason: format!("{} not found on PATH", self.binary.display()),
            },
            Err(err) => FormatOutcome::Unavailable {
                reason: err.to_string(),
            },
        }
    }
}

/// Distinct source lines mentioned in formatter diagnostics
fn count_nonconforming_lines(stderr: &str) -> usize {
    let mut rows = HashSet::new();
    for line in stderr.lines() {
        if let Some(caps) = STYLE_DIAGNOSTIC.captures(line) {
            if let Ok(row) = caps[1].parse::<u64>() {
                rows.insert(row);
            }
        }
    }
    rows.len()
}
