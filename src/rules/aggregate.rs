#![forbid(unsafe_code)]

//! Aggregate checks
//!
//! Rules that accumulate state beyond a single node: per-function frames
//! for length and argument counts, and per-file tallies for export
//! limits. The engine opens a [`Frame`] when its walk enters a function
//! definition, hands interesting nodes to [`AggregateCheck::on_node`],
//! and settles frames and tallies on the way out.

use crate::rules::ast;
use crate::rules::rule::{FileContext, Finding};
use tree_sitter::Node;

/// Per-function state captured when the walk enters a definition
#[derive(Debug, Clone)]
pub struct Frame {
    /// Function name, None when the declarator has no identifier
    pub name: Option<String>,

    /// 1-based line of the definition
    pub line: u32,

    /// 0-based rows spanned by the body block, None for bodyless parses
    pub body_rows: Option<(usize, usize)>,

    /// Number of declared parameters
    pub args: u32,
}

impl Frame {
    pub fn open(def: Node, source: &str) -> Frame {
        let declarator = ast::definition_declarator(def);
        let name = declarator
            .and_then(|d| ast::find_identifier(d, source))
            .map(String::from);
        let args = declarator.and_then(ast::count_parameters).unwrap_or(0) as u32;
        let body_rows = ast::direct_child(def, "compound_statement")
            .map(|body| (body.start_position().row, body.end_position().row));
        Frame {
            name,
            line: ast::start_line(def),
            body_rows,
            args,
        }
    }
}

/// Per-file counters shared by the aggregate checks
#[derive(Debug, Default)]
pub struct FileTally {
    /// Non-static named function definitions seen so far
    pub exported_funcs: u32,

    /// 1-based lines of exported global declarations, in source order
    pub global_lines: Vec<u32>,
}

/// The four aggregate rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateCheck {
    FunctionLength,
    ArgCount,
    ExportedFunctions,
    ExportedGlobals,
}

impl AggregateCheck {
    /// Node kinds this check wants to observe during the walk
    pub fn interest(self) -> &'static [&'static str] {
        match self {
            AggregateCheck::FunctionLength => &[],
            AggregateCheck::ArgCount => &["declaration"],
            AggregateCheck::ExportedFunctions => &["function_definition"],
            AggregateCheck::ExportedGlobals => &["declaration"],
        }
    }

    /// Whether the engine must maintain function frames for this check
    pub fn needs_frames(self) -> bool {
        matches!(
            self,
            AggregateCheck::FunctionLength | AggregateCheck::ArgCount
        )
    }

    pub fn on_node(
        self,
        ctx: &FileContext,
        node: Node,
        tally: &mut FileTally,
        findings: &mut Vec<Finding>,
    ) {
        match self {
            AggregateCheck::FunctionLength => {}
            AggregateCheck::ArgCount => header_prototype_args(ctx, node, findings),
            AggregateCheck::ExportedFunctions => count_exported_function(ctx, node, tally),
            AggregateCheck::ExportedGlobals => record_global(ctx, node, tally),
        }
    }

    /// Judges a function once the walk leaves its definition
    ///
    /// Anonymous frames are skipped; a declarator without an identifier
    /// has nothing to report against.
    pub fn on_frame_close(self, ctx: &FileContext, frame: &Frame, findings: &mut Vec<Finding>) {
        match self {
            AggregateCheck::FunctionLength => {
                if frame.name.is_none() {
                    return;
                }
                let Some((start, end)) = frame.body_rows else {
                    return;
                };
                let count = counted_lines(ctx.lines, start, end);
                let max = ctx.limits.max_lines;
                if count > max {
                    findings.push(Finding::at_line(
                        frame.line,
                        format!("Function has {count} lines (max {max})"),
                    ));
                }
            }
            AggregateCheck::ArgCount => {
                let Some(name) = &frame.name else {
                    return;
                };
                let max = ctx.limits.max_args;
                if frame.args > max {
                    findings.push(Finding::at_line(
                        frame.line,
                        format!("'{name}' has {args} args (max {max})", args = frame.args),
                    ));
                }
            }
            AggregateCheck::ExportedFunctions | AggregateCheck::ExportedGlobals => {}
        }
    }

    /// Judges the file-wide tallies after the walk completes
    pub fn on_file_end(self, ctx: &FileContext, tally: &FileTally, findings: &mut Vec<Finding>) {
        match self {
            AggregateCheck::ExportedFunctions => {
                let max = ctx.limits.max_funcs;
                let count = tally.exported_funcs;
                if count > max {
                    findings.push(Finding::at_line(
                        1,
                        format!("{count} exported functions (max {max})"),
                    ));
                }
            }
            AggregateCheck::ExportedGlobals => {
                let max = ctx.limits.max_globals;
                let count = tally.global_lines.len();
                if count > max as usize {
                    // point at the first declaration past the limit
                    findings.push(Finding::at_line(
                        tally.global_lines[max as usize],
                        format!("{count} exported globals (max {max})"),
                    ));
                }
            }
            AggregateCheck::FunctionLength | AggregateCheck::ArgCount => {}
        }
    }
}

/// Counts effective lines of a body span
///
/// Blank lines, lone braces, and comment lines do not count toward the
/// function length.
pub fn counted_lines(lines: &[&str], start: usize, end: usize) -> u32 {
    let mut count = 0;
    for row in start..=end {
        let Some(line) = lines.get(row) else {
            break;
        };
        let s = line.trim();
        if !s.is_empty()
            && s != "{"
            && s != "}"
            && !s.starts_with("//")
            && !s.starts_with("/*")
            && !s.starts_with('*')
        {
            count += 1;
        }
    }
    count
}

/// Argument counts for prototypes declared in headers
fn header_prototype_args(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    if !ctx.header {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "function_declarator" {
            continue;
        }
        let Some(name) = ast::direct_child(child, "identifier") else {
            continue;
        };
        let args = ast::count_parameters(child).unwrap_or(0) as u32;
        let max = ctx.limits.max_args;
        if args > max {
            let name = ast::node_text(name, ctx.source);
            findings.push(Finding::at_line(
                ast::start_line(child),
                format!("'{name}' has {args} args (max {max})"),
            ));
        }
    }
}

fn count_exported_function(ctx: &FileContext, node: Node, tally: &mut FileTally) {
    if ctx.header {
        return;
    }
    if ast::has_storage_class(node, ctx.source, "static") {
        return;
    }
    let named = ast::definition_declarator(node)
        .and_then(|d| ast::find_identifier(d, ctx.source))
        .is_some();
    if named {
        tally.exported_funcs += 1;
    }
}

/// Records file-scope variable declarations that export a symbol
fn record_global(ctx: &FileContext, node: Node, tally: &mut FileTally) {
    if ctx.header {
        return;
    }
    if !node.parent().is_some_and(|p| p.kind() == "translation_unit") {
        return;
    }
    let mut cursor = node.walk();
    if node
        .children(&mut cursor)
        .any(|c| c.kind() == "function_declarator")
    {
        return;
    }
    if ast::has_storage_class(node, ctx.source, "static")
        || ast::has_storage_class(node, ctx.source, "extern")
    {
        return;
    }
    if ast::find_identifier(node, ctx.source).is_some() {
        tally.global_lines.push(ast::start_line(node));
    }
}
