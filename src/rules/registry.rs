#![forbid(unsafe_code)]

//! Rule registry
//!
//! Validates the catalogue once and serves rules by id, in declaration
//! order. The registry is the single source of truth for which rules
//! exist; configuration only flips their enabled flags.

use crate::error::{RegistryError, UnknownRuleError};
use crate::report;
use crate::rules::builtin;
use crate::rules::rule::Rule;
use crate::types::{Language, RuleId};
use std::collections::HashMap;
use std::sync::LazyLock;

static BUILTIN: LazyLock<Registry> =
    LazyLock::new(|| Registry::build(builtin::catalogue()).expect("builtin catalogue is valid"));

/// Ordered, validated rule catalogue
#[derive(Debug)]
pub struct Registry {
    rules: Vec<(RuleId, Rule)>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Validates and indexes a catalogue, preserving declaration order
    pub fn build(catalogue: Vec<Rule>) -> Result<Registry, RegistryError> {
        let mut rules: Vec<(RuleId, Rule)> = Vec::with_capacity(catalogue.len());
        let mut index = HashMap::with_capacity(catalogue.len());
        for rule in catalogue {
            let id =
                RuleId::new(rule.id).ok_or_else(|| RegistryError::InvalidId(rule.id.to_string()))?;
            if report::is_reserved_id(id.as_str()) {
                return Err(RegistryError::ReservedId(rule.id.to_string()));
            }
            if index.insert(rule.id.to_string(), rules.len()).is_some() {
                return Err(RegistryError::DuplicateId(rule.id.to_string()));
            }
            rules.push((id, rule));
        }
        Ok(Registry { rules, index })
    }

    /// The built-in catalogue, validated once per process
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    pub fn lookup(&self, id: &str) -> Result<&Rule, UnknownRuleError> {
        self.entry(id)
            .map(|(_, rule)| rule)
            .ok_or_else(|| UnknownRuleError(id.to_string()))
    }

    /// Interned id and rule for an id string, None when unknown
    pub fn entry(&self, id: &str) -> Option<(&RuleId, &Rule)> {
        self.index.get(id).map(|&i| {
            let (id, rule) = &self.rules[i];
            (id, rule)
        })
    }

    /// All rules in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (&RuleId, &Rule)> {
        self.rules.iter().map(|(id, rule)| (id, rule))
    }

    /// Rules applying to a language, or the whole catalogue
    pub fn list(&self, language: Option<Language>) -> Vec<&Rule> {
        self.rules
            .iter()
            .map(|(_, rule)| rule)
            .filter(|rule| language.map_or(true, |l| rule.applies_to(l)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
