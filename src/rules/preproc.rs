#![forbid(unsafe_code)]

//! Preprocessor checks
//!
//! Directive-level rules that read the raw text: include guards,
//! directive placement and comments, digraph detection, and include
//! hygiene. Directives never reach the statement grammar, so these scan
//! lines instead of tree nodes.

use crate::rules::rule::{FileContext, Finding};

const DIGRAPHS: [&str; 13] = [
    "??=", "??/", "??'", "??(", "??)", "??!", "??<", "??>", "??-", "<%", "%>", "<:", ":>",
];

/// C standard headers that have `<cx>` counterparts in C++
const C_HEADERS: [&str; 29] = [
    "assert.h",
    "complex.h",
    "ctype.h",
    "errno.h",
    "fenv.h",
    "float.h",
    "inttypes.h",
    "iso646.h",
    "limits.h",
    "locale.h",
    "math.h",
    "setjmp.h",
    "signal.h",
    "stdalign.h",
    "stdarg.h",
    "stdatomic.h",
    "stdbool.h",
    "stddef.h",
    "stdint.h",
    "stdio.h",
    "stdlib.h",
    "stdnoreturn.h",
    "string.h",
    "tgmath.h",
    "threads.h",
    "time.h",
    "uchar.h",
    "wchar.h",
    "wctype.h",
];

/// Missing `#ifndef` include guard in a C header
///
/// The expected guard name is the file name uppercased with `.` and `-`
/// mapped to `_`.
pub fn cpp_guard(ctx: &FileContext, findings: &mut Vec<Finding>) {
    if !ctx.header {
        return;
    }
    let Some(name) = ctx.path.file_name().and_then(|n| n.to_str()) else {
        return;
    };
    let guard: String = name
        .to_uppercase()
        .chars()
        .map(|c| if c == '.' || c == '-' { '_' } else { c })
        .collect();
    let guarded = ctx
        .lines
        .iter()
        .any(|l| l.contains("#ifndef") && l.contains(&guard));
    if !guarded {
        findings.push(Finding::at_line(
            1,
            format!("Missing include guard (#ifndef {guard})"),
        ));
    }
}

/// Directive `#` not in the first column
pub fn cpp_mark(ctx: &FileContext, findings: &mut Vec<Finding>) {
    for (i, line) in ctx.lines.iter().enumerate() {
        if line.trim_start().starts_with('#') && !line.starts_with('#') {
            findings.push(Finding::at_line(i as u32 + 1, "# must be on first column"));
        }
    }
}

/// `#else`/`#endif` without a trailing comment, minor
pub fn cpp_if(ctx: &FileContext, findings: &mut Vec<Finding>) {
    for (i, line) in ctx.lines.iter().enumerate() {
        let s = line.trim();
        if (s.starts_with("#endif") || s.starts_with("#else"))
            && !s.contains("//")
            && !s.contains("/*")
        {
            let directive = if s.starts_with("#else") {
                "#else"
            } else {
                "#endif"
            };
            findings.push(Finding::at_line(
                i as u32 + 1,
                format!("{directive} should have comment"),
            ));
        }
    }
}

/// Digraph and trigraph tokens
pub fn cpp_digraphs(ctx: &FileContext, findings: &mut Vec<Finding>) {
    for (i, line) in ctx.lines.iter().enumerate() {
        for token in DIGRAPHS {
            if let Some(pos) = line.find(token) {
                findings.push(Finding::new(
                    i as u32 + 1,
                    pos as u32 + 1,
                    format!("Digraph '{token}' not allowed"),
                ));
            }
        }
    }
}

/// Missing `#pragma once` in a C++ header
pub fn cpp_pragma_once(ctx: &FileContext, findings: &mut Vec<Finding>) {
    if !ctx.header {
        return;
    }
    let has_pragma = ctx.lines.iter().any(|l| l.trim() == "#pragma once");
    if !has_pragma {
        findings.push(Finding::at_line(
            1,
            "Use #pragma once instead of include guards",
        ));
    }
}

/// `#include <x.h>` of a C standard header in C++
pub fn c_headers(ctx: &FileContext, findings: &mut Vec<Finding>) {
    for (i, line) in ctx.lines.iter().enumerate() {
        let Some(header) = system_include(line) else {
            continue;
        };
        if C_HEADERS.contains(&header) {
            let base = header.strip_suffix(".h").unwrap_or(header);
            findings.push(Finding::at_line(
                i as u32 + 1,
                format!("Use <c{base}> instead of <{header}>"),
            ));
        }
    }
}

/// Local `#include "..."` whose file name is not a C++ header
pub fn cpp_include_filetype(ctx: &FileContext, findings: &mut Vec<Finding>) {
    for (i, line) in ctx.lines.iter().enumerate() {
        let Some(name) = local_include(line) else {
            continue;
        };
        if !name.ends_with(".hh") && !name.ends_with(".hxx") {
            findings.push(Finding::at_line(
                i as u32 + 1,
                format!("Included file '{name}' should have .hh or .hxx extension"),
            ));
        }
    }
}

/// Source of one `#include` line: the file's own header, a system
/// header, or another local header
#[derive(Clone, Copy, PartialEq, Eq)]
enum IncludeKind {
    SelfHeader,
    System,
    Local,
}

/// Include ordering: own header first, system before local, alphabetical
/// within a group, blank line between groups
pub fn cpp_include_order(ctx: &FileContext, findings: &mut Vec<Finding>) {
    let stem = ctx
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let mut includes: Vec<(usize, IncludeKind, &str)> = Vec::new();
    for (i, line) in ctx.lines.iter().enumerate() {
        if let Some(name) = system_include(line) {
            includes.push((i, IncludeKind::System, name));
        } else if let Some(name) = local_include(line) {
            let base = name.rsplit_once('.').map_or(name, |(b, _)| b);
            let kind = if base == stem {
                IncludeKind::SelfHeader
            } else {
                IncludeKind::Local
            };
            includes.push((i, kind, name));
        }
    }
    if includes.is_empty() {
        return;
    }

    // A .hh header pulling its .hxx twin at the bottom is the one layout
    // where the own header legitimately comes last.
    if let Some(&(row, _, name)) = includes
        .iter()
        .find(|inc| inc.1 == IncludeKind::SelfHeader)
    {
        let header_with_impl =
            ctx.path.extension().is_some_and(|e| e == "hh") && name.ends_with(".hxx");
        let first_other = includes.iter().find(|inc| inc.1 != IncludeKind::SelfHeader);
        if !header_with_impl && first_other.is_some_and(|&(other, _, _)| row > other) {
            findings.push(Finding::at_line(
                row as u32 + 1,
                "Same-name header should be included first",
            ));
        }
    }

    if let Some(idx) = includes.iter().position(|inc| inc.1 == IncludeKind::Local) {
        if includes[idx + 1..]
            .iter()
            .any(|inc| inc.1 == IncludeKind::System)
        {
            findings.push(Finding::at_line(
                includes[idx].0 as u32 + 1,
                "System includes should come before local includes",
            ));
        }
    }

    for kind in [
        IncludeKind::SelfHeader,
        IncludeKind::System,
        IncludeKind::Local,
    ] {
        let group: Vec<&(usize, IncludeKind, &str)> =
            includes.iter().filter(|inc| inc.1 == kind).collect();
        for pair in group.windows(2) {
            let prev = pair[0].2.to_lowercase();
            let curr = pair[1].2.to_lowercase();
            if curr < prev {
                findings.push(Finding::at_line(
                    pair[1].0 as u32 + 1,
                    format!(
                        "Includes not in alphabetical order: '{}' before '{}'",
                        pair[1].2, pair[0].2
                    ),
                ));
                break;
            }
        }
    }

    for pair in includes.windows(2) {
        let (prev_row, prev_kind, _) = pair[0];
        let (row, kind, _) = pair[1];
        if kind == prev_kind {
            continue;
        }
        let gap = &ctx.lines[prev_row + 1..row];
        if !gap.iter().any(|l| l.trim().is_empty()) {
            findings.push(Finding::at_line(
                row as u32 + 1,
                "Include groups should be separated by a blank line",
            ));
        }
    }
}

/// Header name of a `#include <...>` line, if any
fn system_include(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix('#')?.trim_start();
    let rest = rest.strip_prefix("include")?.trim_start();
    let rest = rest.strip_prefix('<')?;
    rest.split('>').next()
}

/// Header name of a `#include "..."` line, if any
fn local_include(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix('#')?.trim_start();
    let rest = rest.strip_prefix("include")?.trim_start();
    let rest = rest.strip_prefix('"')?;
    rest.split('"').next()
}
