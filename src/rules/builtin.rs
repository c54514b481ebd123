#![forbid(unsafe_code)]

//! The built-in rule catalogue
//!
//! Declares every shipped rule in listing order: identity, severity,
//! language applicability, the limit it reads (if any), and the check
//! function or aggregate behind it. Adding a rule means adding one entry
//! here; the registry validates the result at startup.

use crate::config::LimitKey;
use crate::rules::aggregate::AggregateCheck;
use crate::rules::rule::{Check, Rule};
use crate::rules::{line, node, preproc};
use crate::types::{Language, Severity};

const BOTH: &[Language] = &[Language::C, Language::Cpp];
const C_ONLY: &[Language] = &[Language::C];
const CPP_ONLY: &[Language] = &[Language::Cpp];

/// Every shipped rule, in listing order
pub fn catalogue() -> Vec<Rule> {
    vec![
        Rule {
            id: "file.dos",
            description: "Files use Unix LF line endings, not CRLF",
            severity: Severity::Major,
            languages: BOTH,
            limit: None,
            check: Check::Line(line::file_dos),
        },
        Rule {
            id: "file.terminate",
            description: "Files end with a newline",
            severity: Severity::Major,
            languages: BOTH,
            limit: None,
            check: Check::Line(line::file_terminate),
        },
        Rule {
            id: "file.spurious",
            description: "No blank lines at the start or end of a file",
            severity: Severity::Major,
            languages: BOTH,
            limit: None,
            check: Check::Line(line::file_spurious),
        },
        Rule {
            id: "file.trailing",
            description: "No trailing whitespace",
            severity: Severity::Minor,
            languages: BOTH,
            limit: None,
            check: Check::Line(line::file_trailing),
        },
        Rule {
            id: "lines.empty",
            description: "No consecutive empty lines",
            severity: Severity::Major,
            languages: BOTH,
            limit: None,
            check: Check::Line(line::lines_empty),
        },
        Rule {
            id: "braces.allman",
            description: "Braces go on their own lines",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: None,
            check: Check::Line(line::braces_allman),
        },
        Rule {
            id: "braces.single_exp",
            description: "Single-statement bodies still take braces",
            severity: Severity::Minor,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &[
                    "if_statement",
                    "while_statement",
                    "for_statement",
                    "do_statement",
                    "else_clause",
                ],
                run: node::braces_single_exp,
            },
        },
        Rule {
            id: "braces.empty",
            description: "Empty bodies are a bare {} on one line",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["compound_statement"],
                run: node::braces_empty,
            },
        },
        Rule {
            id: "fun.length",
            description: "Function bodies stay within the line limit",
            severity: Severity::Major,
            languages: BOTH,
            limit: Some(LimitKey::MaxLines),
            check: Check::Aggregate(AggregateCheck::FunctionLength),
        },
        Rule {
            id: "fun.arg.count",
            description: "Functions take at most the configured argument count",
            severity: Severity::Major,
            languages: BOTH,
            limit: Some(LimitKey::MaxArgs),
            check: Check::Aggregate(AggregateCheck::ArgCount),
        },
        Rule {
            id: "fun.proto.void",
            description: "Empty parameter lists are written (void)",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["function_definition", "declaration"],
                run: node::fun_proto_void,
            },
        },
        Rule {
            id: "fun.proto.void.cxx",
            description: "Empty parameter lists are written (), not (void)",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["function_declarator"],
                run: node::fun_proto_void_cxx,
            },
        },
        Rule {
            id: "export.fun",
            description: "Translation units export a bounded number of functions",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: Some(LimitKey::MaxFuncs),
            check: Check::Aggregate(AggregateCheck::ExportedFunctions),
        },
        Rule {
            id: "export.other",
            description: "Translation units export a bounded number of globals",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: Some(LimitKey::MaxGlobals),
            check: Check::Aggregate(AggregateCheck::ExportedGlobals),
        },
        Rule {
            id: "decl.single",
            description: "One variable declaration per line",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["declaration"],
                run: node::decl_single,
            },
        },
        Rule {
            id: "decl.vla",
            description: "No variable-length arrays",
            severity: Severity::Major,
            languages: BOTH,
            limit: None,
            check: Check::Node {
                kinds: &["declaration"],
                run: node::decl_vla,
            },
        },
        Rule {
            id: "decl.ref",
            description: "References bind to the type, not the variable",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Line(line::decl_ref),
        },
        Rule {
            id: "decl.point",
            description: "Pointers bind to the type, not the variable",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Line(line::decl_point),
        },
        Rule {
            id: "decl.ctor.explicit",
            description: "Single-argument constructors are explicit",
            severity: Severity::Minor,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["class_specifier", "struct_specifier"],
                run: node::decl_ctor_explicit,
            },
        },
        Rule {
            id: "stat.asm",
            description: "No inline assembly",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: None,
            check: Check::Line(line::stat_asm),
        },
        Rule {
            id: "ctrl.empty",
            description: "Empty loop bodies use continue",
            severity: Severity::Major,
            languages: BOTH,
            limit: None,
            check: Check::Node {
                kinds: &["for_statement", "while_statement"],
                run: node::ctrl_empty,
            },
        },
        Rule {
            id: "ctrl.switch",
            description: "Switch statements carry a default case",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["switch_statement"],
                run: node::ctrl_switch,
            },
        },
        Rule {
            id: "ctrl.switch.padding",
            description: "No space before the colon of case and default labels",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["case_statement"],
                run: node::ctrl_switch_padding,
            },
        },
        Rule {
            id: "keyword.goto",
            description: "No goto",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["goto_statement"],
                run: node::keyword_goto,
            },
        },
        Rule {
            id: "expr.cast",
            description: "No explicit casts",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["cast_expression"],
                run: node::expr_cast,
            },
        },
        Rule {
            id: "exp.padding",
            description: "No space between operator and its symbol",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["operator_name"],
                run: node::exp_padding,
            },
        },
        Rule {
            id: "exp.linebreak",
            description: "Wrapped expressions break before binary operators",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["translation_unit"],
                run: node::exp_linebreak,
            },
        },
        Rule {
            id: "err.throw",
            description: "Exceptions are thrown by value, never as literals or new",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["throw_statement"],
                run: node::err_throw,
            },
        },
        Rule {
            id: "err.throw.paren",
            description: "No parentheses after throw",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["throw_statement"],
                run: node::err_throw_paren,
            },
        },
        Rule {
            id: "err.throw.catch",
            description: "Exceptions are caught by reference",
            severity: Severity::Minor,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["catch_clause"],
                run: node::err_throw_catch,
            },
        },
        Rule {
            id: "op.assign",
            description: "Assignment operators return Class& and *this",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["function_definition"],
                run: node::op_assign,
            },
        },
        Rule {
            id: "op.overload",
            description: "No overloads of comma or the short-circuit operators",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["operator_name"],
                run: node::op_overload,
            },
        },
        Rule {
            id: "op.overload.binand",
            description: "No overload of unary address-of",
            severity: Severity::Minor,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["operator_name"],
                run: node::op_overload_binand,
            },
        },
        Rule {
            id: "cpp.guard",
            description: "Headers carry a matching include guard",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: None,
            check: Check::Preproc(preproc::cpp_guard),
        },
        Rule {
            id: "cpp.mark",
            description: "Directive # sits in the first column",
            severity: Severity::Major,
            languages: BOTH,
            limit: None,
            check: Check::Preproc(preproc::cpp_mark),
        },
        Rule {
            id: "cpp.if",
            description: "#else and #endif carry a trailing comment",
            severity: Severity::Minor,
            languages: C_ONLY,
            limit: None,
            check: Check::Preproc(preproc::cpp_if),
        },
        Rule {
            id: "cpp.digraphs",
            description: "No digraphs or trigraphs",
            severity: Severity::Major,
            languages: C_ONLY,
            limit: None,
            check: Check::Preproc(preproc::cpp_digraphs),
        },
        Rule {
            id: "cpp.pragma.once",
            description: "C++ headers use #pragma once",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Preproc(preproc::cpp_pragma_once),
        },
        Rule {
            id: "cpp.include.filetype",
            description: "Local includes name .hh or .hxx headers",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Preproc(preproc::cpp_include_filetype),
        },
        Rule {
            id: "cpp.include.order",
            description: "Includes are grouped and ordered: own header, system, local",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Preproc(preproc::cpp_include_order),
        },
        Rule {
            id: "cpp.constexpr",
            description: "Compile-time constants use constexpr over const",
            severity: Severity::Minor,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["declaration"],
                run: node::cpp_constexpr,
            },
        },
        Rule {
            id: "c.headers",
            description: "C++ code includes <cx> headers, not <x.h>",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Preproc(preproc::c_headers),
        },
        Rule {
            id: "c.std_functions",
            description: "C++ code calls std:: functions, not C ones",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["call_expression"],
                run: node::c_std_functions,
            },
        },
        Rule {
            id: "c.extern",
            description: "No extern \"C\" blocks in C++",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["linkage_specification"],
                run: node::c_extern,
            },
        },
        Rule {
            id: "global.casts",
            description: "C++ code uses named casts, not C-style casts",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["cast_expression"],
                run: node::global_casts,
            },
        },
        Rule {
            id: "global.nullptr",
            description: "C++ code uses nullptr, not NULL",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["null"],
                run: node::global_nullptr,
            },
        },
        Rule {
            id: "global.malloc",
            description: "C++ code manages memory with new/delete or smart pointers",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["call_expression"],
                run: node::global_malloc,
            },
        },
        Rule {
            id: "naming.class",
            description: "Class and struct names are CamelCase",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["class_specifier", "struct_specifier"],
                run: node::naming_class,
            },
        },
        Rule {
            id: "naming.namespace",
            description: "Namespace names are lowercase",
            severity: Severity::Major,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["namespace_definition"],
                run: node::naming_namespace,
            },
        },
        Rule {
            id: "enum.class",
            description: "Scoped enum class over plain enum",
            severity: Severity::Minor,
            languages: CPP_ONLY,
            limit: None,
            check: Check::Node {
                kinds: &["enum_specifier"],
                run: node::enum_class,
            },
        },
        Rule {
            id: "format.clang",
            description: "Files match the clang-format style configuration",
            severity: Severity::Major,
            languages: BOTH,
            limit: None,
            check: Check::External,
        },
    ]
}
