#![forbid(unsafe_code)]

//! Node-match checks
//!
//! Each function here fires once per tree node of the kinds the catalogue
//! wires it to. Checks only look at the node they are handed (and its
//! subtree), never at siblings, so the engine can dispatch them from a
//! single tree walk.

use crate::rules::ast;
use crate::rules::rule::{FileContext, Finding};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tree_sitter::Node;

static CAMEL_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9]*$").expect("pattern is valid"));
static LOWER_NS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("pattern is valid"));

/// C standard library functions with `std::` counterparts
const C_FUNCTIONS: [&str; 26] = [
    "printf", "scanf", "malloc", "calloc", "realloc", "free", "memcpy", "memset", "memmove",
    "strlen", "strcmp", "strncmp", "strcpy", "strncpy", "strcat", "strncat", "atoi", "atof",
    "atol", "strtol", "strtoul", "strtod", "abs", "exit", "qsort", "bsearch",
];

/// Manual memory management calls, reported separately from [`C_FUNCTIONS`]
const MALLOC_FUNCS: [&str; 4] = ["malloc", "calloc", "realloc", "free"];

/// Statement kinds that count as an unbraced single-expression body
const STMT_KINDS: [&str; 5] = [
    "expression_statement",
    "return_statement",
    "break_statement",
    "continue_statement",
    "throw_statement",
];

/// Literal node kinds a `throw` must not carry directly
const LITERAL_KINDS: [&str; 7] = [
    "number_literal",
    "string_literal",
    "char_literal",
    "true",
    "false",
    "null",
    "nullptr",
];

/// Operator overloads that break short-circuit or sequencing semantics
const FORBIDDEN_OPS: [&str; 3] = ["operator,", "operator||", "operator&&"];

/// Empty parameter list written `()` instead of `(void)`
///
/// Fires on definitions everywhere and on prototypes in headers. A
/// `(void)` list parses as one `parameter_declaration`, so zero entries
/// means the list was left empty.
pub fn fun_proto_void(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    match node.kind() {
        "function_definition" => {
            let Some(declarator) = ast::definition_declarator(node) else {
                return;
            };
            let Some(name) = ast::find_identifier(declarator, ctx.source) else {
                return;
            };
            if ast::count_parameters(declarator).unwrap_or(0) > 0 {
                return;
            }
            let text = ast::node_text(node, ctx.source);
            if text.contains("()") || text.contains("( )") {
                findings.push(Finding::at_line(
                    ast::start_line(node),
                    format!("'{name}' should use (void) for empty params"),
                ));
            }
        }
        "declaration" => {
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
                if ast::count_parameters(child).unwrap_or(0) > 0 {
                    continue;
                }
                let text = ast::node_text(child, ctx.source);
                if text.contains("()") || text.contains("( )") {
                    let name = ast::node_text(name, ctx.source);
                    findings.push(Finding::at_line(
                        ast::start_line(child),
                        format!("'{name}' should use (void)"),
                    ));
                }
            }
        }
        _ => {}
    }
}

/// More than one variable declared in a single declaration
pub fn decl_single(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    const DECLARATOR_KINDS: [&str; 4] = [
        "init_declarator",
        "pointer_declarator",
        "identifier",
        "array_declarator",
    ];
    let mut cursor = node.walk();
    if node
        .children(&mut cursor)
        .any(|c| c.kind() == "function_declarator")
    {
        return;
    }
    let mut cursor = node.walk();
    let declarators = node
        .children(&mut cursor)
        .filter(|c| DECLARATOR_KINDS.contains(&c.kind()))
        .count();
    if declarators > 1 {
        findings.push(Finding::new(
            ast::start_line(node),
            ast::start_column(node),
            "One declaration per line",
        ));
    }
}

/// Array sized by a runtime variable
///
/// An all-uppercase size identifier is assumed to be a macro constant and
/// tolerated.
pub fn decl_vla(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let mut arrays = Vec::new();
    ast::collect_kind(node, "array_declarator", &mut arrays);
    for arr in arrays {
        let mut size = None;
        let mut cursor = arr.walk();
        for child in arr.children(&mut cursor) {
            match child.kind() {
                "[" => size = None,
                "]" => break,
                _ => size = Some(child),
            }
        }
        let Some(size) = size else {
            continue;
        };
        if size.kind() == "identifier" && !is_upper(ast::node_text(size, ctx.source)) {
            findings.push(Finding::new(
                ast::start_line(arr),
                ast::start_column(arr),
                "VLA not allowed",
            ));
        }
    }
}

/// At least one uppercase character and no lowercase ones
fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Loop with a bare `;` body
pub fn ctrl_empty(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "expression_statement" {
            continue;
        }
        let mut inner = child.walk();
        if child.children(&mut inner).all(|c| c.kind() == ";") {
            findings.push(Finding::at_line(
                ast::start_line(child),
                "Use 'continue' for empty loops",
            ));
        }
    }
}

pub fn keyword_goto(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    findings.push(Finding::new(
        ast::start_line(node),
        ast::start_column(node),
        "goto not allowed",
    ));
}

pub fn expr_cast(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    findings.push(Finding::new(
        ast::start_line(node),
        ast::start_column(node),
        "Explicit cast not allowed",
    ));
}

/// C-style cast in C++ code
pub fn global_casts(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    findings.push(Finding::new(
        ast::start_line(node),
        ast::start_column(node),
        "Use C++ casts (static_cast, etc.) instead of C-style casts",
    ));
}

/// `NULL` literal in C++ code
///
/// The grammar folds `NULL` and `nullptr` into one node kind, so the
/// spelling decides.
pub fn global_nullptr(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    if ast::node_text(node, ctx.source) == "NULL" {
        findings.push(Finding::new(
            ast::start_line(node),
            ast::start_column(node),
            "Use nullptr instead of NULL",
        ));
    }
}

/// Direct call to a manual memory management function
pub fn global_malloc(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let Some(name) = call_target(node, ctx.source) else {
        return;
    };
    if MALLOC_FUNCS.contains(&name) {
        findings.push(Finding::new(
            ast::start_line(node),
            ast::start_column(node),
            format!("Don't use {name}(), use new/delete or smart pointers"),
        ));
    }
}

/// Unqualified call to a C standard library function
///
/// Memory management calls are left to the dedicated rule so a single
/// `malloc(n)` never reports twice.
pub fn c_std_functions(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let Some(name) = call_target(node, ctx.source) else {
        return;
    };
    if C_FUNCTIONS.contains(&name) && !MALLOC_FUNCS.contains(&name) {
        findings.push(Finding::new(
            ast::start_line(node),
            ast::start_column(node),
            format!("Use std::{name} instead of {name}"),
        ));
    }
}

/// Called name of a `call_expression`, when it is a plain identifier
///
/// Qualified calls like `std::printf` and member calls resolve to other
/// node kinds and return None.
fn call_target<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    let target = node.child(0)?;
    if target.kind() != "identifier" {
        return None;
    }
    Some(ast::node_text(target, source))
}

pub fn c_extern(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    findings.push(Finding::new(
        ast::start_line(node),
        ast::start_column(node),
        "No extern \"C\" in C++ code",
    ));
}

/// Class or struct name that is not CamelCase
pub fn naming_class(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let Some(tag) = ast::direct_child(node, "type_identifier") else {
        return;
    };
    let name = ast::node_text(tag, ctx.source);
    if !CAMEL_CASE.is_match(name) {
        findings.push(Finding::new(
            ast::start_line(tag),
            ast::start_column(tag),
            format!("Class/struct '{name}' should be CamelCase"),
        ));
    }
}

/// Namespace name that is not lowercase
pub fn naming_namespace(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let Some(tag) = ast::direct_child(node, "namespace_identifier") else {
        return;
    };
    let name = ast::node_text(tag, ctx.source);
    if !LOWER_NS.is_match(name) {
        findings.push(Finding::new(
            ast::start_line(tag),
            ast::start_column(tag),
            format!("Namespace '{name}' should be lowercase"),
        ));
    }
}

/// Switch without a `default` case
///
/// Only direct `case_statement` children of the switch body count, so a
/// default in a nested switch does not satisfy the outer one.
pub fn ctrl_switch(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let body = ast::direct_child(node, "compound_statement");
    let has_default = body.is_some_and(|b| {
        let mut cursor = b.walk();
        b.children(&mut cursor).any(|c| {
            c.kind() == "case_statement" && c.child(0).is_some_and(|k| k.kind() == "default")
        })
    });
    if !has_default {
        findings.push(Finding::at_line(
            ast::start_line(node),
            "Switch statement should have a default case",
        ));
    }
}

/// Plain `enum` where `enum class` is expected, minor
pub fn enum_class(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    if ast::direct_child(node, "class").is_none() {
        findings.push(Finding::at_line(
            ast::start_line(node),
            "Prefer 'enum class' over plain 'enum'",
        ));
    }
}

/// Unbraced single-statement body under a control structure, minor
///
/// For `if`/`while`/`for`/`do` the body is the last direct statement
/// child. An `else_clause` is handled separately so that `else if` chains
/// are not flagged while bare `else` bodies are.
pub fn braces_single_exp(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    if node.kind() == "else_clause" {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if STMT_KINDS.contains(&child.kind()) {
                findings.push(Finding::at_line(
                    ast::start_line(child),
                    "Single-expression block should have braces",
                ));
            }
        }
        return;
    }
    let mut cursor = node.walk();
    let body = node
        .children(&mut cursor)
        .filter(|c| STMT_KINDS.contains(&c.kind()))
        .last();
    if let Some(body) = body {
        findings.push(Finding::at_line(
            ast::start_line(body),
            "Single-expression block should have braces",
        ));
    }
}

/// File-scope `const` with a literal initializer, minor
///
/// Only top-level declarations count; a local const is not a header
/// constant candidate.
pub fn cpp_constexpr(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    if !node
        .parent()
        .is_some_and(|p| p.kind() == "translation_unit")
    {
        return;
    }
    let mut cursor = node.walk();
    let is_const = node
        .children(&mut cursor)
        .any(|c| c.kind() == "type_qualifier" && ast::node_text(c, ctx.source) == "const");
    if !is_const {
        return;
    }
    let mut cursor = node.walk();
    for init in node
        .children(&mut cursor)
        .filter(|c| c.kind() == "init_declarator")
    {
        let mut inner = init.walk();
        let literal = init.children(&mut inner).any(|c| {
            matches!(
                c.kind(),
                "number_literal" | "string_literal" | "true" | "false" | "char_literal"
            )
        });
        if literal {
            findings.push(Finding::at_line(
                ast::start_line(node),
                "Consider using constexpr for compile-time constant",
            ));
            break;
        }
    }
}

/// Single-argument constructor without `explicit`, minor
///
/// Copy and move constructors taking the class itself by reference are
/// exempt.
pub fn decl_ctor_explicit(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    const MEMBER_KINDS: [&str; 3] = ["declaration", "field_declaration", "function_definition"];
    let Some(tag) = ast::direct_child(node, "type_identifier") else {
        return;
    };
    let class_name = ast::node_text(tag, ctx.source);
    let Some(body) = ast::direct_child(node, "field_declaration_list") else {
        return;
    };
    let mut cursor = body.walk();
    for member in body.children(&mut cursor) {
        if !MEMBER_KINDS.contains(&member.kind()) {
            continue;
        }
        let Some(declarator) = ast::direct_child(member, "function_declarator") else {
            continue;
        };
        if ast::direct_child(member, "explicit_function_specifier").is_some() {
            continue;
        }
        if ast::find_identifier(declarator, ctx.source) != Some(class_name) {
            continue;
        }
        let Some(list) = ast::parameter_list(declarator) else {
            continue;
        };
        let mut entries = list.walk();
        let params: Vec<Node> = list
            .children(&mut entries)
            .filter(|c| c.kind() == "parameter_declaration")
            .collect();
        if params.len() != 1 {
            continue;
        }
        let by_ref = ast::direct_child(params[0], "reference_declarator").is_some();
        if by_ref && mentions_type(params[0], class_name, ctx.source) {
            continue;
        }
        findings.push(Finding::at_line(
            ast::start_line(member),
            format!("Single-argument constructor '{class_name}' should be explicit"),
        ));
    }
}

/// Whether a parameter names the given class type, directly or as a
/// template argument
fn mentions_type(param: Node, class_name: &str, source: &str) -> bool {
    let mut cursor = param.walk();
    for child in param.children(&mut cursor) {
        match child.kind() {
            "type_identifier" if ast::node_text(child, source) == class_name => return true,
            "template_type" => {
                let mut inner = child.walk();
                let named = child.children(&mut inner).any(|c| {
                    c.kind() == "type_identifier" && ast::node_text(c, source) == class_name
                });
                if named {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Space before the colon of a `case` or `default` label
pub fn ctrl_switch_padding(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let Some(colon) = ast::direct_child(node, ":") else {
        return;
    };
    let row = colon.start_position().row;
    let col = colon.start_position().column;
    if col == 0 {
        return;
    }
    let padded = ctx
        .line(row)
        .as_bytes()
        .get(col - 1)
        .is_some_and(|b| b.is_ascii_whitespace());
    if padded {
        findings.push(Finding::new(
            row as u32 + 1,
            col as u32 + 1,
            "No space before colon in case/default label",
        ));
    }
}

/// Empty compound body not written as a bare `{}`
pub fn braces_empty(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let mut cursor = node.walk();
    let empty = node
        .children(&mut cursor)
        .all(|c| matches!(c.kind(), "{" | "}" | "comment"));
    if !empty {
        return;
    }
    if node.start_position().row != node.end_position().row {
        findings.push(Finding::at_line(
            ast::start_line(node),
            "Empty body should use {} on the same line",
        ));
    } else if ast::node_text(node, ctx.source) != "{}" {
        findings.push(Finding::at_line(
            ast::start_line(node),
            "Empty body should be {} with no space",
        ));
    }
}

/// `throw` of a bare literal or a `new` expression
pub fn err_throw(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if LITERAL_KINDS.contains(&child.kind()) {
            findings.push(Finding::new(
                ast::start_line(node),
                ast::start_column(node),
                "Don't throw literals, throw exception objects",
            ));
        } else if child.kind() == "new_expression" {
            findings.push(Finding::new(
                ast::start_line(node),
                ast::start_column(node),
                "Don't throw with new, throw by value",
            ));
        }
    }
}

/// Parenthesized expression directly after `throw`
pub fn err_throw_paren(_ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    if ast::direct_child(node, "parenthesized_expression").is_some() {
        findings.push(Finding::new(
            ast::start_line(node),
            ast::start_column(node),
            "No parentheses after throw",
        ));
    }
}

/// Catch parameter taken by value, minor
pub fn err_throw_catch(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let Some(list) = ast::direct_child(node, "parameter_list") else {
        return;
    };
    let mut cursor = list.walk();
    for param in list.children(&mut cursor) {
        if param.kind() != "parameter_declaration" {
            continue;
        }
        let text = ast::node_text(param, ctx.source);
        if !text.contains('&') && text != "..." {
            findings.push(Finding::at_line(
                ast::start_line(param),
                "Catch exceptions by reference",
            ));
        }
    }
}

/// Space between the `operator` keyword and its symbol
pub fn exp_padding(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let text = ast::node_text(node, ctx.source);
    let padded = text
        .get("operator".len()..)
        .is_some_and(|rest| rest.contains(' '));
    if padded {
        findings.push(Finding::new(
            ast::start_line(node),
            ast::start_column(node),
            "No space between 'operator' and the operator symbol",
        ));
    }
}

/// Overload of comma or a short-circuit operator
pub fn op_overload(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let op: String = ast::node_text(node, ctx.source).split_whitespace().collect();
    if FORBIDDEN_OPS.contains(&op.as_str()) {
        findings.push(Finding::at_line(
            ast::start_line(node),
            format!("Don't overload {op}"),
        ));
    }
}

/// Overload of unary address-of, minor
pub fn op_overload_binand(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let op: String = ast::node_text(node, ctx.source).split_whitespace().collect();
    if op == "operator&" {
        findings.push(Finding::at_line(
            ast::start_line(node),
            "Don't overload operator&",
        ));
    }
}

/// `operator=` definitions must return `Class&` and `*this`
pub fn op_assign(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let mut names = Vec::new();
    ast::collect_kind(node, "operator_name", &mut names);
    if !names
        .iter()
        .any(|n| ast::node_text(*n, ctx.source) == "operator=")
    {
        return;
    }
    if ast::direct_child(node, "reference_declarator").is_none() {
        findings.push(Finding::at_line(
            ast::start_line(node),
            "Assignment operator should return Class&",
        ));
        return;
    }
    let Some(body) = ast::direct_child(node, "compound_statement") else {
        return;
    };
    if !ast::node_text(body, ctx.source).contains("return *this") {
        findings.push(Finding::at_line(
            ast::start_line(node),
            "Assignment operator should return *this",
        ));
    }
}

/// `(void)` parameter list, which C++ spells `()`
pub fn fun_proto_void_cxx(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let Some(list) = ast::parameter_list(node) else {
        return;
    };
    let mut cursor = list.walk();
    let params: Vec<Node> = list
        .children(&mut cursor)
        .filter(|c| c.kind() == "parameter_declaration")
        .collect();
    if params.len() != 1 || ast::node_text(params[0], ctx.source).trim() != "void" {
        return;
    }
    let name = ast::find_identifier(node, ctx.source).unwrap_or("?");
    findings.push(Finding::at_line(
        ast::start_line(node),
        format!("'{name}' should use () not (void) in C++"),
    ));
}

/// Binary operators ordered longest first so `&&` wins over `&`
const BINARY_OPS: [&str; 18] = [
    "&&", "||", "<<", ">>", "==", "!=", "<=", ">=", "+", "-", "*", "/", "%", "&", "|", "^", "<",
    ">",
];

/// Line break placed after a binary operator instead of before it
///
/// Runs once per file on the root node. Template closers, reference and
/// pointer declarators, and trailing return types also end in these
/// tokens; their rows are collected from the tree and exempted.
pub fn exp_linebreak(ctx: &FileContext, node: Node, findings: &mut Vec<Finding>) {
    let excluded = non_binary_op_rows(node);
    for (i, line) in ctx.lines.iter().enumerate() {
        let s = line.trim();
        if s.is_empty()
            || s.starts_with('#')
            || s.starts_with("//")
            || s.starts_with("/*")
            || s.starts_with('*')
        {
            continue;
        }
        for op in BINARY_OPS {
            if !s.ends_with(op) || s.ends_with(&format!("//{op}")) {
                continue;
            }
            let before = s[..s.len() - op.len()].trim_end();
            if before.is_empty() || before.ends_with(['(', ',', '=']) {
                continue;
            }
            if !excluded.contains(&(i, op)) {
                findings.push(Finding::at_line(
                    i as u32 + 1,
                    format!("Line break should come before '{op}', not after"),
                ));
            }
            break;
        }
    }
}

/// Rows where `>`, `>>`, `&`, `&&`, or `*` end a line without being
/// binary operators
fn non_binary_op_rows(root: Node) -> HashSet<(usize, &'static str)> {
    let mut excluded = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "template_parameter_list" | "template_argument_list" => {
                let row = node.end_position().row;
                excluded.insert((row, ">"));
                excluded.insert((row, ">>"));
            }
            "reference_declarator" | "abstract_reference_declarator" | "type_descriptor" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if matches!(child.kind(), "&" | "&&") {
                        excluded.insert((child.start_position().row, child.kind()));
                    }
                }
            }
            "pointer_declarator" | "abstract_pointer_declarator" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if child.kind() == "*" {
                        excluded.insert((child.start_position().row, "*"));
                    }
                }
            }
            "trailing_return_type" => {
                let row = node.end_position().row;
                for op in ["&", "*", ">", ">>"] {
                    excluded.insert((row, op));
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    excluded
}
