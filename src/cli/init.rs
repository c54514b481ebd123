//! Init command implementation
//!
//! Writes a commented starter configuration so a project can start from
//! the defaults and toggle rules or limits by uncommenting lines.

use crate::report::{EXIT_CLEAN, EXIT_FAILURE};
use std::fs;
use std::io;
use std::path::Path;

/// Default content for .cstyle.toml
pub const DEFAULT_CONFIG_TOML: &str = r#"# cstyle configuration
#
# Values here override the built-in defaults; command-line flags
# override values here.

# Start from a named preset:
# preset = "relaxed"

# Numeric limits:
# max_lines = 30
# max_args = 4
# max_funcs = 10
# max_globals = 1

[rules]
# Toggle rules by id (dotted ids need quotes):
# "keyword.goto" = false
# "cpp.pragma.once" = false
# "format.clang" = false
"#;

/// Outcome of writing the starter configuration
#[derive(Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was written
    Created,
    /// A file already existed and force was not given
    Refused,
}

/// Run the init command
pub fn run_init(force: bool) -> i32 {
    match write_starter(Path::new("."), force) {
        Ok(WriteOutcome::Created) => {
            println!("Created .cstyle.toml");
            EXIT_CLEAN
        }
        Ok(WriteOutcome::Refused) => {
            eprintln!("error: .cstyle.toml already exists (use --force to overwrite)");
            EXIT_FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            EXIT_FAILURE
        }
    }
}

/// Writes the starter file into `dir`
///
/// Refuses to touch an existing file unless `force` is set.
pub fn write_starter(dir: &Path, force: bool) -> io::Result<WriteOutcome> {
    let path = dir.join(".cstyle.toml");
    if path.exists() && !force {
        return Ok(WriteOutcome::Refused);
    }
    fs::write(&path, DEFAULT_CONFIG_TOML)?;
    Ok(WriteOutcome::Created)
}
