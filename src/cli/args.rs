//! CLI argument parsing using clap

use crate::types::Language;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for cstyle commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if the terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// Language filter for the list command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LanguageArg {
    /// Rules that apply to C
    C,
    /// Rules that apply to C++
    Cpp,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Language {
        match arg {
            LanguageArg::C => Language::C,
            LanguageArg::Cpp => Language::Cpp,
        }
    }
}

/// cstyle CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "cstyle")]
#[command(about = "Coding style checker for C and C++ sources")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorMode,
}

/// Available cstyle subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check files and directories against the style rules
    Check(CheckArgs),

    /// List the rule catalogue
    List(ListArgs),

    /// Write a starter .cstyle.toml into the current directory
    Init(InitArgs),
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files or directories to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Configuration preset to start from
    #[arg(long)]
    pub preset: Option<String>,

    /// Configuration file to use instead of searching for one
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum counted lines per function body
    #[arg(long, value_name = "N")]
    pub max_lines: Option<u32>,

    /// Maximum parameters per function
    #[arg(long, value_name = "N")]
    pub max_args: Option<u32>,

    /// Maximum exported functions per file
    #[arg(long, value_name = "N")]
    pub max_funcs: Option<u32>,

    /// Maximum exported globals per file
    #[arg(long, value_name = "N")]
    pub max_globals: Option<u32>,

    /// Enable a rule by id (repeatable)
    #[arg(long, value_name = "ID")]
    pub enable: Vec<String>,

    /// Disable a rule by id (repeatable)
    #[arg(long, value_name = "ID")]
    pub disable: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Only print the summary and verdict
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show rules applying to this language
    #[arg(long)]
    pub language: Option<LanguageArg>,

    /// Output format
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}
