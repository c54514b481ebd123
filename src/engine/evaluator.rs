#![forbid(unsafe_code)]

//! Rule evaluation over a single parsed file
//!
//! The [`Evaluator`] is built once per run from the registry and resolved
//! settings, then shared across worker threads. Evaluating a file runs the
//! line and preprocessor checks over the raw text, walks the syntax tree
//! once dispatching node and aggregate checks by node kind, closes out the
//! file-wide tallies, and finally consults the external format checker.
//!
//! A panic inside one rule is caught, reported as a reserved `internal.fault`
//! diagnostic, and mutes that rule for the remainder of the file. One broken
//! rule never takes down the run or suppresses the others.

use crate::config::{Limits, Settings};
use crate::engine::provider;
use crate::format::{FormatChecker, FormatOutcome};
use crate::report::{FileReport, Violation};
use crate::rules::aggregate::{AggregateCheck, FileTally, Frame};
use crate::rules::rule::{Check, FileContext, Finding, LineCheck, NodeCheck};
use crate::rules::Registry;
use crate::types::{Language, RuleId, Severity};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tree_sitter::Tree;

/// An enabled check bound to its catalogue identity
struct Bound<'r, C> {
    id: &'r RuleId,
    severity: Severity,
    check: C,
}

/// Enabled rules for one language, indexed for single-pass dispatch
struct RuleSet<'r> {
    line: Vec<Bound<'r, LineCheck>>,
    preproc: Vec<Bound<'r, LineCheck>>,
    node_rules: HashMap<&'static str, Vec<Bound<'r, NodeCheck>>>,
    aggregates: Vec<Bound<'r, AggregateCheck>>,
    /// Indices into `aggregates`, keyed by the node kinds they observe
    agg_by_kind: HashMap<&'static str, Vec<usize>>,
    external: Option<(&'r RuleId, Severity)>,
    needs_frames: bool,
}

impl<'r> RuleSet<'r> {
    fn build(registry: &'r Registry, settings: &Settings, language: Language) -> RuleSet<'r> {
        let mut set = RuleSet {
            line: Vec::new(),
            preproc: Vec::new(),
            node_rules: HashMap::new(),
            aggregates: Vec::new(),
            agg_by_kind: HashMap::new(),
            external: None,
            needs_frames: false,
        };
        for (id, rule) in registry.entries() {
            if !rule.applies_to(language) || !settings.is_enabled(id.as_str()) {
                continue;
            }
            let severity = rule.severity;
            match rule.check {
                Check::Line(run) => set.line.push(Bound {
                    id,
                    severity,
                    check: run,
                }),
                Check::Preproc(run) => set.preproc.push(Bound {
                    id,
                    severity,
                    check: run,
                }),
                Check::Node { kinds, run } => {
                    for &kind in kinds {
                        set.node_rules.entry(kind).or_default().push(Bound {
                            id,
                            severity,
                            check: run,
                        });
                    }
                }
                Check::Aggregate(agg) => {
                    let index = set.aggregates.len();
                    for &kind in agg.interest() {
                        set.agg_by_kind.entry(kind).or_default().push(index);
                    }
                    set.needs_frames |= agg.needs_frames();
                    set.aggregates.push(Bound {
                        id,
                        severity,
                        check: agg,
                    });
                }
                Check::External => set.external = Some((id, severity)),
            }
        }
        set
    }
}

/// Accumulates violations for one file and isolates panicking rules
struct Collector {
    violations: Vec<Violation>,
    faulted: HashSet<String>,
}

impl Collector {
    fn new() -> Collector {
        Collector {
            violations: Vec::new(),
            faulted: HashSet::new(),
        }
    }

    /// Runs one check invocation, converting findings into violations
    ///
    /// A panic becomes a single `internal.fault` diagnostic and the rule
    /// is skipped for the rest of this file.
    fn run<F>(&mut self, path: &Path, id: &RuleId, severity: Severity, invoke: F)
    where
        F: FnOnce(&mut Vec<Finding>),
    {
        if self.faulted.contains(id.as_str()) {
            return;
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut findings = Vec::new();
            invoke(&mut findings);
            findings
        }));
        match outcome {
            Ok(findings) => {
                for finding in findings {
                    self.violations.push(Violation {
                        rule_id: id.clone(),
                        file: path.to_path_buf(),
                        line: finding.line,
                        column: finding.column,
                        severity,
                        message: finding.message,
                    });
                }
            }
            Err(payload) => {
                self.violations
                    .push(Violation::rule_fault(id.as_str(), path, panic_message(&payload)));
                self.faulted.insert(id.as_str().to_string());
            }
        }
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}

/// Evaluates source files against the enabled rules
///
/// Construction partitions the registry into one [`RuleSet`] per language,
/// so per-file evaluation touches only the rules that can fire.
pub struct Evaluator<'r> {
    c_rules: RuleSet<'r>,
    cpp_rules: RuleSet<'r>,
    limits: Limits,
    format: Box<dyn FormatChecker>,
}

impl<'r> Evaluator<'r> {
    pub fn new(
        registry: &'r Registry,
        settings: &Settings,
        format: Box<dyn FormatChecker>,
    ) -> Evaluator<'r> {
        Evaluator {
            c_rules: RuleSet::build(registry, settings, Language::C),
            cpp_rules: RuleSet::build(registry, settings, Language::Cpp),
            limits: settings.limits,
            format,
        }
    }

    /// Runs every enabled rule for `language` over one file's source
    pub fn evaluate(&self, path: &Path, source: &str, language: Language) -> FileReport {
        let set = match language {
            Language::C => &self.c_rules,
            Language::Cpp => &self.cpp_rules,
        };
        let Some(tree) = provider::parse(source, language) else {
            return FileReport::parse_failure(path, language, format!("not parseable as {language}"));
        };
        let lines: Vec<&str> = source.split('\n').collect();
        let ctx = FileContext {
            path,
            language,
            header: Language::is_header(path),
            source,
            lines: &lines,
            limits: self.limits,
        };

        let mut collector = Collector::new();
        for bound in &set.line {
            collector.run(path, bound.id, bound.severity, |f| (bound.check)(&ctx, f));
        }
        for bound in &set.preproc {
            collector.run(path, bound.id, bound.severity, |f| (bound.check)(&ctx, f));
        }
        if !set.node_rules.is_empty() || !set.aggregates.is_empty() {
            walk_tree(set, &ctx, &tree, &mut collector);
        }
        if let Some((id, severity)) = set.external {
            self.run_format(&ctx, id, severity, &mut collector);
        }

        let mut violations = collector.violations;
        violations.sort_by(|a, b| {
            (a.line, a.column, a.rule_id.as_str()).cmp(&(b.line, b.column, b.rule_id.as_str()))
        });
        FileReport {
            path: path.to_path_buf(),
            language,
            violations,
            parse_succeeded: true,
        }
    }

    fn run_format(
        &self,
        ctx: &FileContext,
        id: &RuleId,
        severity: Severity,
        collector: &mut Collector,
    ) {
        match self.format.check(ctx.path, ctx.language) {
            FormatOutcome::Compliant => {}
            FormatOutcome::Nonconforming { lines } => {
                let message = match lines {
                    0 => "Needs formatting".to_string(),
                    1 => "1 line needs formatting".to_string(),
                    n => format!("{n} lines need formatting"),
                };
                collector.violations.push(Violation {
                    rule_id: id.clone(),
                    file: ctx.path.to_path_buf(),
                    line: 1,
                    column: 1,
                    severity,
                    message,
                });
            }
            FormatOutcome::Unavailable { reason } => {
                log::warn!("format check skipped for {}: {reason}", ctx.path.display());
            }
        }
    }
}

/// Single depth-first pass over the tree, dispatching by node kind
///
/// Function definitions open a [`Frame`] on the way down and are judged
/// when the walk leaves them, so nested constructs are attributed to the
/// innermost enclosing function.
fn walk_tree(set: &RuleSet, ctx: &FileContext, tree: &Tree, collector: &mut Collector) {
    let mut tally = FileTally::default();
    let mut frames: Vec<Frame> = Vec::new();
    let mut cursor = tree.walk();

    'outer: loop {
        let node = cursor.node();
        if set.needs_frames && node.kind() == "function_definition" {
            frames.push(Frame::open(node, ctx.source));
        }
        if let Some(rules) = set.node_rules.get(node.kind()) {
            for bound in rules {
                collector.run(ctx.path, bound.id, bound.severity, |f| {
                    (bound.check)(ctx, node, f)
                });
            }
        }
        if let Some(indices) = set.agg_by_kind.get(node.kind()) {
            for &i in indices {
                let bound = &set.aggregates[i];
                collector.run(ctx.path, bound.id, bound.severity, |f| {
                    bound.check.on_node(ctx, node, &mut tally, f)
                });
            }
        }
        if cursor.goto_first_child() {
            continue 'outer;
        }
        loop {
            let leaving = cursor.node();
            if set.needs_frames && leaving.kind() == "function_definition" {
                if let Some(frame) = frames.pop() {
                    for bound in &set.aggregates {
                        if bound.check.needs_frames() {
                            collector.run(ctx.path, bound.id, bound.severity, |f| {
                                bound.check.on_frame_close(ctx, &frame, f)
                            });
                        }
                    }
                }
            }
            if cursor.goto_next_sibling() {
                continue 'outer;
            }
            if !cursor.goto_parent() {
                break 'outer;
            }
        }
    }

    for bound in &set.aggregates {
        collector.run(ctx.path, bound.id, bound.severity, |f| {
            bound.check.on_file_end(ctx, &tally, f)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{self, Patch};
    use crate::rules::rule::Rule;
    use std::path::PathBuf;

    struct NoFormatter;

    impl FormatChecker for NoFormatter {
        fn check(&self, _path: &Path, _language: Language) -> FormatOutcome {
            FormatOutcome::Unavailable {
                reason: "disabled in tests".to_string(),
            }
        }
    }

    struct FixedFormatter(FormatOutcome);

    impl FormatChecker for FixedFormatter {
        fn check(&self, _path: &Path, _language: Language) -> FormatOutcome {
            self.0.clone()
        }
    }

    fn evaluator() -> Evaluator<'static> {
        let registry = Registry::builtin();
        let settings = Settings::defaults(registry);
        Evaluator::new(registry, &settings, Box::new(NoFormatter))
    }

    fn ids(report: &FileReport) -> Vec<&str> {
        report.violations.iter().map(|v| v.rule_id.as_str()).collect()
    }

    #[test]
    fn clean_c_file_reports_nothing() {
        let report = evaluator().evaluate(
            Path::new("add.c"),
            "int add(int a, int b)\n{\n    return a + b;\n}\n",
            Language::C,
        );
        assert!(report.parse_succeeded);
        assert_eq!(report.violations, vec![]);
    }

    #[test]
    fn goto_in_c_reports_position_and_message() {
        let report = evaluator().evaluate(
            Path::new("jump.c"),
            "static void jump(void)\n{\n    goto done;\ndone:\n    return;\n}\n",
            Language::C,
        );
        assert_eq!(ids(&report), vec!["keyword.goto"]);
        let v = &report.violations[0];
        assert_eq!((v.line, v.column), (3, 5));
        assert_eq!(v.severity, Severity::Major);
        assert_eq!(v.message, "goto not allowed");
    }

    #[test]
    fn violations_come_out_sorted_by_position() {
        let source = "static void jump(void)\n{\n    int x = 1;   \n    goto done;\ndone:\n    return;\n}\n";
        let report = evaluator().evaluate(Path::new("jump.c"), source, Language::C);
        assert_eq!(ids(&report), vec!["file.trailing", "keyword.goto"]);
        assert_eq!(report.violations[0].line, 3);
        assert_eq!(report.violations[1].line, 4);
    }

    #[test]
    fn disabled_rule_does_not_fire() {
        let registry = Registry::builtin();
        let mut patch = Patch::default();
        patch.rules.insert("keyword.goto".to_string(), false);
        let settings = config::resolve(registry, None, None, Some(&patch)).unwrap();
        let evaluator = Evaluator::new(registry, &settings, Box::new(NoFormatter));
        let report = evaluator.evaluate(
            Path::new("jump.c"),
            "static void jump(void)\n{\n    goto done;\ndone:\n    return;\n}\n",
            Language::C,
        );
        assert_eq!(report.violations, vec![]);
    }

    #[test]
    fn language_selects_the_rule_set() {
        let source = "void f()\n{\n    go();\n}\n";
        let as_c = evaluator().evaluate(Path::new("f.c"), source, Language::C);
        assert_eq!(ids(&as_c), vec!["fun.proto.void"]);
        assert_eq!(
            as_c.violations[0].message,
            "'f' should use (void) for empty params"
        );
        let as_cpp = evaluator().evaluate(Path::new("f.cc"), source, Language::Cpp);
        assert_eq!(as_cpp.violations, vec![]);
    }

    #[test]
    fn cpp_file_hits_cpp_rules() {
        let source = "#include <cstdlib>\n\nvoid* grab(int n)\n{\n    if (n > 0)\n        return malloc(n);\n    return NULL;\n}\n";
        let report = evaluator().evaluate(Path::new("grab.cc"), source, Language::Cpp);
        assert_eq!(
            ids(&report),
            vec!["braces.single_exp", "global.malloc", "global.nullptr"]
        );
        assert_eq!(report.violations[0].severity, Severity::Minor);
        assert_eq!(report.violations[1].line, 6);
        assert_eq!(report.violations[2].line, 7);
    }

    #[test]
    fn cpp_error_and_include_rules_fire_through_the_engine() {
        let source = "#include \"other.hh\"\n\n#include <stdexcept>\n\nvoid fail()\n{\n    try\n    {\n        throw 42;\n    }\n    catch (int e)\n    {\n        log(e);\n    }\n}\n";
        let report = evaluator().evaluate(Path::new("fail.cc"), source, Language::Cpp);
        assert_eq!(
            ids(&report),
            vec!["cpp.include.order", "err.throw", "err.throw.catch"]
        );
        assert_eq!(report.violations[0].line, 1);
        assert_eq!(report.violations[1].line, 9);
        assert_eq!(report.violations[2].line, 11);
        assert_eq!(report.violations[2].severity, Severity::Minor);
    }

    #[test]
    fn header_prototype_uses_header_rules() {
        let source = "#ifndef MATH_H\n#define MATH_H\n\nvoid f();\n\n#endif /* MATH_H */\n";
        let report = evaluator().evaluate(Path::new("math.h"), source, Language::C);
        assert_eq!(ids(&report), vec!["fun.proto.void"]);
        assert_eq!(report.violations[0].message, "'f' should use (void)");
        assert_eq!(report.violations[0].line, 4);
    }

    #[test]
    fn lowered_line_limit_flags_a_function() {
        let registry = Registry::builtin();
        let patch = Patch {
            max_lines: Some(3),
            ..Patch::default()
        };
        let settings = config::resolve(registry, None, None, Some(&patch)).unwrap();
        let evaluator = Evaluator::new(registry, &settings, Box::new(NoFormatter));
        let mut source = String::from("int work(void)\n{\n    int total = 0;\n");
        for _ in 0..4 {
            source.push_str("    total += 1;\n");
        }
        source.push_str("    return total;\n}\n");
        let report = evaluator.evaluate(Path::new("work.c"), &source, Language::C);
        assert_eq!(ids(&report), vec!["fun.length"]);
        assert_eq!(report.violations[0].message, "Function has 6 lines (max 3)");
        assert_eq!(report.violations[0].line, 1);
    }

    #[test]
    fn relaxed_preset_lifts_the_line_limit() {
        let registry = Registry::builtin();
        let settings = config::resolve(registry, Some("relaxed"), None, None).unwrap();
        let evaluator = Evaluator::new(registry, &settings, Box::new(NoFormatter));
        let body = |n: usize| {
            let mut source = String::from("int work(void)\n{\n");
            for i in 0..n - 1 {
                source.push_str(&format!("    step({i});\n"));
            }
            source.push_str("    return 0;\n}\n");
            source
        };
        let report = evaluator.evaluate(Path::new("work.c"), &body(40), Language::C);
        assert_eq!(report.violations, vec![]);
        let report = evaluator.evaluate(Path::new("work.c"), &body(41), Language::C);
        assert_eq!(ids(&report), vec!["fun.length"]);
        assert_eq!(
            report.violations[0].message,
            "Function has 41 lines (max 40)"
        );
    }

    #[test]
    fn nonconforming_format_reports_at_line_one() {
        let registry = Registry::builtin();
        let settings = Settings::defaults(registry);
        let evaluator = Evaluator::new(
            registry,
            &settings,
            Box::new(FixedFormatter(FormatOutcome::Nonconforming { lines: 3 })),
        );
        let report = evaluator.evaluate(
            Path::new("add.c"),
            "int add(int a, int b)\n{\n    return a + b;\n}\n",
            Language::C,
        );
        assert_eq!(ids(&report), vec!["format.clang"]);
        let v = &report.violations[0];
        assert_eq!((v.line, v.column), (1, 1));
        assert_eq!(v.message, "3 lines need formatting");
        assert_eq!(v.severity, Severity::Major);
    }

    #[test]
    fn single_nonconforming_line_uses_singular_message() {
        let registry = Registry::builtin();
        let settings = Settings::defaults(registry);
        let evaluator = Evaluator::new(
            registry,
            &settings,
            Box::new(FixedFormatter(FormatOutcome::Nonconforming { lines: 1 })),
        );
        let report = evaluator.evaluate(
            Path::new("add.c"),
            "int add(int a, int b)\n{\n    return a + b;\n}\n",
            Language::C,
        );
        assert_eq!(report.violations[0].message, "1 line needs formatting");
    }

    #[test]
    fn unavailable_formatter_adds_no_violation() {
        let report = evaluator().evaluate(
            Path::new("add.c"),
            "int add(int a, int b)\n{\n    return a + b;\n}\n",
            Language::C,
        );
        assert!(!ids(&report).contains(&"format.clang"));
    }

    fn panicking_line(_ctx: &FileContext, _findings: &mut Vec<Finding>) {
        panic!("boom");
    }

    fn panicking_node(_ctx: &FileContext, _node: tree_sitter::Node, _findings: &mut Vec<Finding>) {
        panic!("boom");
    }

    fn steady_line(_ctx: &FileContext, findings: &mut Vec<Finding>) {
        findings.push(Finding::at_line(1, "steady"));
    }

    const BOTH: &[Language] = &[Language::C, Language::Cpp];

    #[test]
    fn panicking_rule_becomes_fault_and_others_survive() {
        let registry = Registry::build(vec![
            Rule {
                id: "test.panic",
                description: "always panics",
                severity: Severity::Major,
                languages: BOTH,
                limit: None,
                check: Check::Line(panicking_line),
            },
            Rule {
                id: "test.steady",
                description: "always fires",
                severity: Severity::Minor,
                languages: BOTH,
                limit: None,
                check: Check::Line(steady_line),
            },
        ])
        .unwrap();
        let settings = Settings::defaults(&registry);
        let evaluator = Evaluator::new(&registry, &settings, Box::new(NoFormatter));
        let report = evaluator.evaluate(Path::new("x.c"), "int a;\n", Language::C);
        assert_eq!(ids(&report), vec!["internal.fault", "test.steady"]);
        assert_eq!(
            report.violations[0].message,
            "rule 'test.panic' failed: boom"
        );
    }

    #[test]
    fn faulted_rule_is_muted_for_the_rest_of_the_file() {
        let registry = Registry::build(vec![Rule {
            id: "test.panic",
            description: "panics on every identifier",
            severity: Severity::Major,
            languages: BOTH,
            limit: None,
            check: Check::Node {
                kinds: &["identifier"],
                run: panicking_node,
            },
        }])
        .unwrap();
        let settings = Settings::defaults(&registry);
        let evaluator = Evaluator::new(&registry, &settings, Box::new(NoFormatter));
        let report = evaluator.evaluate(Path::new("x.c"), "int a;\nint b;\nint c;\n", Language::C);
        assert_eq!(ids(&report), vec!["internal.fault"]);
    }

    #[test]
    fn report_carries_path_and_language() {
        let report = evaluator().evaluate(Path::new("src/add.c"), "int x;\n", Language::C);
        assert_eq!(report.path, PathBuf::from("src/add.c"));
        assert_eq!(report.language, Language::C);
    }
}
