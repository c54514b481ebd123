#![forbid(unsafe_code)]

//! Expansion of CLI path arguments into a file list

use crate::error::WalkError;
use crate::types::Language;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// A discovered file paired with the language it will be evaluated as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
}

/// Expands path arguments into the sorted, de-duplicated list of files
/// to check.
///
/// Directories are walked recursively; the walk honors gitignore and
/// `.ignore` files and skips hidden entries. Explicit file arguments are
/// taken as-is when their extension maps to a language, so a missing or
/// unreadable file surfaces as a per-file diagnostic instead of being
/// dropped. Arguments with unrecognized extensions are skipped with a
/// warning.
pub fn discover_files(paths: &[PathBuf]) -> Result<Vec<SourceFile>, WalkError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_directory(path, &mut files)?;
        } else if let Some(language) = Language::from_path(path) {
            files.push(SourceFile {
                path: path.clone(),
                language,
            });
        } else {
            log::warn!("skipping {}: not a C/C++ source file", path.display());
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    Ok(files)
}

fn walk_directory(root: &Path, files: &mut Vec<SourceFile>) -> Result<(), WalkError> {
    for entry in WalkBuilder::new(root).build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Some(language) = Language::from_path(entry.path()) {
            files.push(SourceFile {
                path: entry.path().to_path_buf(),
                language,
            });
        }
    }
    Ok(())
}
