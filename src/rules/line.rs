#![forbid(unsafe_code)]

//! Line-scan checks
//!
//! These operate on the raw line sequence only and never look at the tree.

use crate::rules::rule::{FileContext, Finding};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// CRLF line endings anywhere in the file
pub fn file_dos(ctx: &FileContext, findings: &mut Vec<Finding>) {
    if ctx.source.contains("\r\n") {
        findings.push(Finding::at_line(1, "Use Unix LF, not DOS CRLF"));
    }
}

/// Missing final newline
pub fn file_terminate(ctx: &FileContext, findings: &mut Vec<Finding>) {
    if !ctx.source.is_empty() && !ctx.source.ends_with('\n') {
        findings.push(Finding::at_line(
            ctx.lines.len() as u32,
            "File must end with newline",
        ));
    }
}

/// Blank line at the start or end of the file
pub fn file_spurious(ctx: &FileContext, findings: &mut Vec<Finding>) {
    if let Some(first) = ctx.lines.first() {
        if first.trim().is_empty() {
            findings.push(Finding::at_line(1, "No blank lines at start of file"));
        }
    }
    // A trailing newline leaves one empty element; the last real line
    // sits before it.
    let phantom = ctx.lines.last().is_some_and(|l| l.is_empty());
    let end = ctx.lines.len().checked_sub(if phantom { 2 } else { 1 });
    if let Some(idx) = end {
        if ctx.line(idx).trim().is_empty() {
            findings.push(Finding::at_line(
                idx as u32 + 1,
                "No blank lines at end of file",
            ));
        }
    }
}

/// Consecutive blank lines
pub fn lines_empty(ctx: &FileContext, findings: &mut Vec<Finding>) {
    for i in 1..ctx.lines.len() {
        if ctx.lines[i].trim().is_empty() && ctx.lines[i - 1].trim().is_empty() {
            findings.push(Finding::at_line(
                i as u32 + 1,
                "No consecutive empty lines",
            ));
        }
    }
}

/// Trailing whitespace, minor
pub fn file_trailing(ctx: &FileContext, findings: &mut Vec<Finding>) {
    for (i, line) in ctx.lines.iter().enumerate() {
        let kept = line.trim_end();
        if kept.len() != line.len() {
            findings.push(Finding::new(
                i as u32 + 1,
                kept.len() as u32 + 1,
                "Trailing whitespace",
            ));
        }
    }
}

/// Inline assembly keywords
pub fn stat_asm(ctx: &FileContext, findings: &mut Vec<Finding>) {
    const ASM_KEYWORDS: [&str; 3] = ["asm(", "__asm__", "__asm"];
    for (i, line) in ctx.lines.iter().enumerate() {
        let s = line.trim();
        if ASM_KEYWORDS.iter().any(|kw| s.contains(kw)) {
            findings.push(Finding::at_line(i as u32 + 1, "asm not allowed"));
        }
    }
}

static CHAR_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(?:\\.|[^'\\])'").expect("pattern is valid"));

static REF_GLUED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w\s+&\w").expect("pattern is valid"));
static PTR_GLUED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w\s+\*\w").expect("pattern is valid"));

/// Keywords that open a declaration for the placement heuristic
const TYPE_KEYWORDS: [&str; 19] = [
    "int", "char", "float", "double", "long", "short", "unsigned", "signed", "void", "bool",
    "auto", "const", "static", "volatile", "extern", "virtual", "inline", "explicit", "mutable",
];

/// `&` attached to the variable instead of the type
pub fn decl_ref(ctx: &FileContext, findings: &mut Vec<Finding>) {
    scan_glued_declarator(ctx, &REF_GLUED, "& should be next to type, not variable", findings);
}

/// `*` attached to the variable instead of the type
pub fn decl_point(ctx: &FileContext, findings: &mut Vec<Finding>) {
    scan_glued_declarator(ctx, &PTR_GLUED, "* should be next to type, not variable", findings);
}

/// Reports each pattern hit on lines that look like declarations
///
/// The pattern ends in `<symbol><word-char>`, so the symbol always sits
/// two bytes before the match end.
fn scan_glued_declarator(
    ctx: &FileContext,
    pattern: &Regex,
    message: &str,
    findings: &mut Vec<Finding>,
) {
    for (i, line) in ctx.lines.iter().enumerate() {
        let s = line.trim_start();
        if s.starts_with('#') || s.starts_with("//") || s.starts_with("/*") || s.starts_with('*') {
            continue;
        }
        if !looks_like_declaration(line) {
            continue;
        }
        for found in pattern.find_iter(line) {
            findings.push(Finding::new(
                i as u32 + 1,
                found.end() as u32 - 1,
                message,
            ));
        }
    }
}

/// Heuristic for declaration lines: a known type keyword among the first
/// three words, a leading CamelCase type name, or a `std::` type
fn looks_like_declaration(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some(&first) = words.first() else {
        return false;
    };
    if words.iter().take(3).any(|w| TYPE_KEYWORDS.contains(w)) {
        return true;
    }
    if first.starts_with(char::is_uppercase) && first.chars().all(char::is_alphabetic) {
        return true;
    }
    first.starts_with("std::")
}

/// Allman brace placement
///
/// An opening brace must be the first token on its line and a closing
/// brace the last. Skipped: preprocessor lines, comment interiors,
/// character-literal braces, initializer braces (`= {`), the `do { ... }
/// while` idiom, one-line empty blocks, and line-continuation lines.
pub fn braces_allman(ctx: &FileContext, findings: &mut Vec<Finding>) {
    let mut in_comment = false;

    for (i, raw) in ctx.lines.iter().enumerate() {
        let line_no = i as u32 + 1;
        let s = raw.trim();

        if s.contains("/*") && !s.contains("*/") {
            in_comment = true;
            continue;
        }
        if in_comment {
            if s.contains("*/") {
                in_comment = false;
            }
            continue;
        }
        if s.is_empty() || s.starts_with('#') || s.starts_with("//") {
            continue;
        }

        let clean = blank_char_literals(s);
        let continuation = raw.trim_end().ends_with('\\');

        if let Some(pos) = clean.find('{') {
            let before = clean[..pos].trim();
            let whole = clean.trim();
            if !before.is_empty()
                && !has_assignment(before)
                && whole != "{}"
                && whole != "{ }"
                && before != "do"
                && !continuation
            {
                let column = raw.find('{').unwrap_or(pos) as u32 + 1;
                findings.push(Finding::new(
                    line_no,
                    column,
                    "Opening brace must be on its own line",
                ));
            }
        }

        if let Some(pos) = clean.find('}') {
            if !continuation {
                let after = clean[pos + 1..].trim();
                if !after.is_empty()
                    && !after.starts_with("while")
                    && !after.starts_with("//")
                    && !after.starts_with("/*")
                    && after != ";"
                    && after != ","
                    && after != ");"
                {
                    let column = raw.find('}').unwrap_or(pos) as u32 + 1;
                    findings.push(Finding::new(
                        line_no,
                        column,
                        "Closing brace must be on its own line",
                    ));
                }
            }
        }
    }
}

/// Replaces character literals with same-length blanks so their quotes and
/// braces never count as code
fn blank_char_literals(s: &str) -> Cow<'_, str> {
    CHAR_LITERAL.replace_all(s, |caps: &Captures| " ".repeat(caps[0].len()))
}

/// True when the text contains a bare `=` (assignment or initializer),
/// ignoring `==`, `!=`, `<=`, and `>=`
fn has_assignment(s: &str) -> bool {
    let bytes = s.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'=' {
            continue;
        }
        let prev_ok = i == 0 || !matches!(bytes[i - 1], b'!' | b'=' | b'<' | b'>');
        let next_ok = i + 1 >= bytes.len() || bytes[i + 1] != b'=';
        if prev_ok && next_ok {
            return true;
        }
    }
    false
}
