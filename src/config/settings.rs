#![forbid(unsafe_code)]

//! Configuration resolution
//!
//! Four layers are merged into one total [`Settings`] value: builtin
//! defaults, an optional named preset, an optional project config file, and
//! CLI overrides. Every layer above the defaults is a sparse [`Patch`] that
//! overrides only the keys it sets. Resolution is a pure function of its
//! inputs; the resolved value is immutable for the rest of the run.

use crate::error::{ConfigError, UnknownRuleError};
use crate::rules::Registry;
use crate::types::RuleId;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Numeric limit a threshold rule compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKey {
    MaxLines,
    MaxArgs,
    MaxFuncs,
    MaxGlobals,
}

impl LimitKey {
    /// Configuration key name for this limit
    pub fn as_str(self) -> &'static str {
        match self {
            LimitKey::MaxLines => "max_lines",
            LimitKey::MaxArgs => "max_args",
            LimitKey::MaxFuncs => "max_funcs",
            LimitKey::MaxGlobals => "max_globals",
        }
    }
}

/// Numeric limits, always positive after resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Counted lines allowed in a function body
    pub max_lines: u32,
    /// Parameters allowed on a function
    pub max_args: u32,
    /// Exported functions allowed per translation unit
    pub max_funcs: u32,
    /// Exported globals allowed per translation unit
    pub max_globals: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_lines: 30,
            max_args: 4,
            max_funcs: 10,
            max_globals: 1,
        }
    }
}

impl Limits {
    /// Value of the given limit
    pub fn get(&self, key: LimitKey) -> u32 {
        match key {
            LimitKey::MaxLines => self.max_lines,
            LimitKey::MaxArgs => self.max_args,
            LimitKey::MaxFuncs => self.max_funcs,
            LimitKey::MaxGlobals => self.max_globals,
        }
    }
}

/// One sparse configuration layer
///
/// A patch carries only the keys it overrides. Presets, the project file,
/// and the CLI all produce this same structure, so merging is a single
/// code path regardless of where a layer came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub max_lines: Option<u32>,
    pub max_args: Option<u32>,
    pub max_funcs: Option<u32>,
    pub max_globals: Option<u32>,
    /// Per-rule enable toggles, keyed by rule id
    pub rules: BTreeMap<String, bool>,
}

impl Patch {
    /// True when the patch overrides nothing
    pub fn is_empty(&self) -> bool {
        self.max_lines.is_none()
            && self.max_args.is_none()
            && self.max_funcs.is_none()
            && self.max_globals.is_none()
            && self.rules.is_empty()
    }
}

/// Returns the patch for a named preset, or None if the name is unknown
///
/// The preset table is data; adding a preset is adding a match arm.
pub fn preset(name: &str) -> Option<Patch> {
    match name {
        "relaxed" => Some(Patch {
            max_lines: Some(40),
            rules: BTreeMap::from([
                ("keyword.goto".to_string(), false),
                ("expr.cast".to_string(), false),
            ]),
            ..Patch::default()
        }),
        _ => None,
    }
}

/// Names of all known presets
pub fn preset_names() -> &'static [&'static str] {
    &["relaxed"]
}

/// Fully resolved, total configuration
///
/// Holds an enabled flag for every catalogue rule and a value for every
/// limit. Never mutated after [`resolve`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Resolved numeric limits
    pub limits: Limits,
    /// Preset that was applied, if any
    pub preset: Option<String>,
    enabled: BTreeMap<RuleId, bool>,
}

impl Settings {
    /// The defaults layer: builtin limits, every catalogue rule enabled
    pub fn defaults(registry: &Registry) -> Self {
        Settings {
            limits: Limits::default(),
            preset: None,
            enabled: registry
                .entries()
                .map(|(id, _)| (id.clone(), true))
                .collect(),
        }
    }

    /// Whether the rule with this id is enabled
    ///
    /// Unknown ids (including the reserved diagnostic ids) are never
    /// enabled; they cannot appear in the map by construction.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.get(id).copied().unwrap_or(false)
    }

    /// Whether the external format check will run
    pub fn format_check(&self) -> bool {
        self.is_enabled("format.clang")
    }

    fn apply_patch(&mut self, patch: &Patch, registry: &Registry) -> Result<(), ConfigError> {
        if let Some(v) = patch.max_lines {
            self.limits.max_lines = positive("max_lines", i64::from(v))?;
        }
        if let Some(v) = patch.max_args {
            self.limits.max_args = positive("max_args", i64::from(v))?;
        }
        if let Some(v) = patch.max_funcs {
            self.limits.max_funcs = positive("max_funcs", i64::from(v))?;
        }
        if let Some(v) = patch.max_globals {
            self.limits.max_globals = positive("max_globals", i64::from(v))?;
        }
        for (name, &on) in &patch.rules {
            let (id, _) = registry
                .entry(name)
                .ok_or_else(|| UnknownRuleError(name.clone()))?;
            self.enabled.insert(id.clone(), on);
        }
        Ok(())
    }
}

/// Merges the configuration layers in ascending precedence
///
/// `defaults → preset → file → cli`; each later layer overrides only the
/// keys it explicitly sets.
///
/// # Errors
///
/// Fails when the preset name is unknown, a patch references a rule id the
/// registry does not know, or a limit is not a positive integer.
pub fn resolve(
    registry: &Registry,
    preset_name: Option<&str>,
    file: Option<&Patch>,
    cli: Option<&Patch>,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::defaults(registry);
    if let Some(name) = preset_name {
        let patch = preset(name).ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
        settings.apply_patch(&patch, registry)?;
        settings.preset = Some(name.to_string());
    }
    if let Some(patch) = file {
        settings.apply_patch(patch, registry)?;
    }
    if let Some(patch) = cli {
        settings.apply_patch(patch, registry)?;
    }
    Ok(settings)
}

/// Project configuration file as written on disk
///
/// Top-level limits, an optional preset name, and a `[rules]` table of
/// quoted rule ids mapped to booleans:
///
/// ```toml
/// preset = "relaxed"
/// max_lines = 35
///
/// [rules]
/// "keyword.goto" = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub preset: Option<String>,
    pub max_lines: Option<i64>,
    pub max_args: Option<i64>,
    pub max_funcs: Option<i64>,
    pub max_globals: Option<i64>,
    #[serde(default)]
    pub rules: BTreeMap<String, bool>,
}

impl FileConfig {
    /// Load a configuration file from disk
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` when the file cannot be read and
    /// `ConfigError::Parse` when the TOML is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a configuration file from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Convert the raw file values into a sparse layer patch
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidLimit` for zero, negative, or
    /// out-of-range limits.
    pub fn to_patch(&self) -> Result<Patch, ConfigError> {
        Ok(Patch {
            max_lines: self.max_lines.map(|v| positive("max_lines", v)).transpose()?,
            max_args: self.max_args.map(|v| positive("max_args", v)).transpose()?,
            max_funcs: self.max_funcs.map(|v| positive("max_funcs", v)).transpose()?,
            max_globals: self
                .max_globals
                .map(|v| positive("max_globals", v))
                .transpose()?,
            rules: self.rules.clone(),
        })
    }
}

fn positive(key: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value <= 0 || value > i64::from(u32::MAX) {
        return Err(ConfigError::InvalidLimit { key, value });
    }
    Ok(value as u32)
}
