//! Check command implementation
//!
//! Resolves configuration, discovers files, evaluates them in parallel,
//! prints the chosen output format, and derives the process exit code.

use crate::cli::args::{CheckArgs, ColorMode, OutputFormat};
use crate::config::{self, FileConfig, Settings};
use crate::engine::{Evaluator, SourceFile, discover_files};
use crate::error::{ConfigError, WalkError};
use crate::format::ClangFormat;
use crate::output::{HumanFormatter, JsonlFormatter};
use crate::report::{self, EXIT_FAILURE, FileReport};
use crate::rules::Registry;
use rayon::prelude::*;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use termcolor::{ColorChoice, StandardStream};

/// Error type specific to the check command
#[derive(Debug, thiserror::Error)]
pub(crate) enum CheckError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Walk(#[from] WalkError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the check command
///
/// Exit code 0 when every file parsed and produced zero violations;
/// 1 for violations, parse failures, zero matched files, or a
/// configuration error.
pub fn run_check(args: &CheckArgs, color: ColorMode) -> i32 {
    match run_check_inner(args, color) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            EXIT_FAILURE
        }
    }
}

fn run_check_inner(args: &CheckArgs, color: ColorMode) -> Result<i32, CheckError> {
    let registry = Registry::builtin();
    let settings = resolve_settings(args, registry)?;

    let files = discover_files(&args.paths)?;
    if files.is_empty() {
        eprintln!("error: no C/C++ source files found");
        return Ok(EXIT_FAILURE);
    }

    let evaluator = Evaluator::new(registry, &settings, Box::new(ClangFormat::new()));
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|file| check_file(&evaluator, file))
        .collect();
    let summary = report::aggregate(&reports);

    match args.format {
        OutputFormat::Human => {
            let stream = StandardStream::stdout(stream_color(color));
            let mut lock = stream.lock();
            HumanFormatter::new(args.quiet).write(&mut lock, &reports, &summary)?;
        }
        OutputFormat::Jsonl => {
            print!("{}", JsonlFormatter::new().format(&reports, &summary));
        }
    }

    Ok(summary.exit_code())
}

/// Reads and evaluates one file
///
/// A read failure becomes a per-file parse diagnostic rather than
/// aborting the run; invalid UTF-8 is replaced rather than rejected.
fn check_file(evaluator: &Evaluator, file: &SourceFile) -> FileReport {
    match fs::read(&file.path) {
        Ok(bytes) => {
            let source = String::from_utf8_lossy(&bytes);
            evaluator.evaluate(&file.path, &source, file.language)
        }
        Err(err) => FileReport::parse_failure(&file.path, file.language, err.to_string()),
    }
}

/// Resolves settings from defaults, preset, config file, and CLI flags
///
/// An explicit `--config` must name an existing file; without it, the
/// usual candidates are searched upward from the current directory. A
/// `--preset` flag overrides the preset named in the file.
fn resolve_settings(args: &CheckArgs, registry: &Registry) -> Result<Settings, CheckError> {
    let file = match &args.config {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.clone()).into());
            }
            Some(FileConfig::load(path)?)
        }
        None => match config::find_config_file(Path::new(".")) {
            Some(path) => Some(FileConfig::load(path)?),
            None => None,
        },
    };

    let preset_name = args
        .preset
        .as_deref()
        .or_else(|| file.as_ref().and_then(|f| f.preset.as_deref()));
    let file_patch = file.as_ref().map(FileConfig::to_patch).transpose()?;
    let cli_patch = cli_patch(args);

    let settings = config::resolve(
        registry,
        preset_name,
        file_patch.as_ref(),
        Some(&cli_patch),
    )?;
    Ok(settings)
}

/// Builds the CLI override layer from the flags
///
/// A rule both enabled and disabled on the command line ends up
/// disabled.
fn cli_patch(args: &CheckArgs) -> config::Patch {
    let mut patch = config::Patch {
        max_lines: args.max_lines,
        max_args: args.max_args,
        max_funcs: args.max_funcs,
        max_globals: args.max_globals,
        ..config::Patch::default()
    };
    for id in &args.enable {
        patch.rules.insert(id.clone(), true);
    }
    for id in &args.disable {
        patch.rules.insert(id.clone(), false);
    }
    patch
}

fn stream_color(color: ColorMode) -> ColorChoice {
    match color {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto => {
            if std::io::stdout().is_terminal() {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args_with(f: impl FnOnce(&mut CheckArgs)) -> CheckArgs {
        let mut args = CheckArgs {
            paths: vec![PathBuf::from(".")],
            preset: None,
            config: None,
            max_lines: None,
            max_args: None,
            max_funcs: None,
            max_globals: None,
            enable: Vec::new(),
            disable: Vec::new(),
            format: OutputFormat::Human,
            quiet: false,
        };
        f(&mut args);
        args
    }

    #[test]
    fn test_cli_patch_limits() {
        let args = args_with(|a| {
            a.max_lines = Some(40);
            a.max_globals = Some(3);
        });
        let patch = cli_patch(&args);
        assert_eq!(patch.max_lines, Some(40));
        assert_eq!(patch.max_args, None);
        assert_eq!(patch.max_globals, Some(3));
        assert!(patch.rules.is_empty());
    }

    #[test]
    fn test_cli_patch_disable_wins_over_enable() {
        let args = args_with(|a| {
            a.enable = vec!["keyword.goto".to_string()];
            a.disable = vec!["keyword.goto".to_string()];
        });
        let patch = cli_patch(&args);
        assert_eq!(patch.rules.get("keyword.goto"), Some(&false));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let args = args_with(|a| {
            a.config = Some(PathBuf::from("/nonexistent/cstyle.toml"));
        });
        let err = resolve_settings(&args, Registry::builtin()).unwrap_err();
        assert!(matches!(
            err,
            CheckError::Config(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_cli_preset_overrides_file_preset() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("cstyle.toml");
        fs::write(&config_path, "preset = \"relaxed\"\nmax_args = 6\n").unwrap();

        // No preset flag: the file's preset applies (relaxed lifts max_lines).
        let args = args_with(|a| a.config = Some(config_path.clone()));
        let settings = resolve_settings(&args, Registry::builtin()).unwrap();
        assert_eq!(settings.preset.as_deref(), Some("relaxed"));
        assert_eq!(settings.limits.max_lines, 40);
        assert_eq!(settings.limits.max_args, 6);

        // An unknown preset flag beats the file's valid one.
        let args = args_with(|a| {
            a.config = Some(config_path.clone());
            a.preset = Some("strictest".to_string());
        });
        let err = resolve_settings(&args, Registry::builtin()).unwrap_err();
        assert!(matches!(
            err,
            CheckError::Config(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_stream_color_explicit_modes() {
        assert_eq!(stream_color(ColorMode::Always), ColorChoice::Always);
        assert_eq!(stream_color(ColorMode::Never), ColorChoice::Never);
    }

    #[test]
    fn test_check_error_display() {
        let err = CheckError::Config(ConfigError::UnknownPreset("x".to_string()));
        assert_eq!(err.to_string(), "unknown preset 'x'");
    }
}
