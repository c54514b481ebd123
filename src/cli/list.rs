//! List command implementation
//!
//! Prints the rule catalogue in registry order, optionally filtered to
//! one language, as aligned text or JSONL.

use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::LimitKey;
use crate::report::EXIT_CLEAN;
use crate::rules::{Domain, Registry, Rule};
use crate::types::{Language, Severity};
use serde::Serialize;

/// Run the list command
pub fn run_list(args: &ListArgs) -> i32 {
    let language = args.language.map(Language::from);
    let rules = Registry::builtin().list(language);
    match args.format {
        OutputFormat::Human => print!("{}", render_human(&rules)),
        OutputFormat::Jsonl => print!("{}", render_jsonl(&rules)),
    }
    EXIT_CLEAN
}

fn languages_label(rule: &Rule) -> String {
    let mut parts = Vec::new();
    if rule.applies_to(Language::C) {
        parts.push("C");
    }
    if rule.applies_to(Language::Cpp) {
        parts.push("C++");
    }
    parts.join(",")
}

fn render_human(rules: &[&Rule]) -> String {
    let mut output = String::new();
    output.push_str(&format!("{} rules\n\n", rules.len()));
    for rule in rules {
        let limit = rule
            .limit
            .map(|key| format!(" ({})", key.as_str()))
            .unwrap_or_default();
        output.push_str(&format!(
            "{:<18} {:<6} {:<6} {:<13} {}{}\n",
            rule.id,
            rule.severity,
            languages_label(rule),
            rule.domain(),
            rule.description,
            limit,
        ));
    }
    output
}

/// Catalogue record for JSONL output
#[derive(Debug, Serialize)]
struct RuleRecord {
    id: &'static str,
    description: &'static str,
    severity: Severity,
    languages: &'static [Language],
    domain: Domain,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<&'static str>,
}

fn render_jsonl(rules: &[&Rule]) -> String {
    let mut output = String::new();
    for rule in rules {
        let record = RuleRecord {
            id: rule.id,
            description: rule.description,
            severity: rule.severity,
            languages: rule.languages,
            domain: rule.domain(),
            limit: rule.limit.map(LimitKey::as_str),
        };
        if let Ok(json) = serde_json::to_string(&record) {
            output.push_str(&json);
            output.push('\n');
        }
    }
    output
}
