#![forbid(unsafe_code)]

//! Upward file discovery
//!
//! Finds the nearest configuration file by walking from a start directory
//! toward the filesystem root. The same walk serves the project config
//! lookup and the per-file style config lookup of the external format
//! check, so it lives behind a small cached searcher.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Project config file names, in precedence order within one directory
pub const CONFIG_CANDIDATES: &[&str] = &[".cstyle.toml", "cstyle.toml"];

/// Finds the nearest project config file at or above `start`
///
/// Within one directory the candidates are tried in
/// [`CONFIG_CANDIDATES`] order; a match in a nearer directory always wins
/// over any match further up.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    search_upward(CONFIG_CANDIDATES.iter().copied(), &absolute(start))
}

/// Cached upward search for a fixed set of file names
///
/// Results are memoized per start directory, including misses. The cache
/// never invalidates; a run observes one consistent snapshot of the tree
/// even if files appear or vanish mid-run.
#[derive(Debug)]
pub struct UpwardSearch {
    names: Vec<String>,
    cache: Mutex<HashMap<PathBuf, Option<PathBuf>>>,
}

impl UpwardSearch {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        UpwardSearch {
            names: names.into_iter().map(Into::into).collect(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Nearest match at or above `start`, consulting the cache first
    pub fn find(&self, start: &Path) -> Option<PathBuf> {
        let start = absolute(start);
        if let Some(cached) = self.cache.lock().unwrap().get(&start) {
            return cached.clone();
        }

        let mut visited = Vec::new();
        let mut found = None;
        let mut dir = Some(start.as_path());
        while let Some(current) = dir {
            visited.push(current.to_path_buf());
            if let Some(hit) = first_match(self.names.iter().map(String::as_str), current) {
                found = Some(hit);
                break;
            }
            dir = current.parent();
        }

        // Every directory walked through resolves to the same answer.
        let mut cache = self.cache.lock().unwrap();
        for dir in visited {
            cache.insert(dir, found.clone());
        }
        found
    }
}

fn search_upward<'a>(
    names: impl Iterator<Item = &'a str> + Clone,
    start: &Path,
) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        if let Some(hit) = first_match(names.clone(), current) {
            return Some(hit);
        }
        dir = current.parent();
    }
    None
}

fn first_match<'a>(names: impl Iterator<Item = &'a str>, dir: &Path) -> Option<PathBuf> {
    for name in names {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_in_start_dir() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join(".cstyle.toml");
        fs::write(&config, "max_lines = 25\n").unwrap();

        let found = find_config_file(dir.path()).unwrap();
        assert_eq!(found, config);
    }

    #[test]
    fn test_walks_upward() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src").join("net");
        fs::create_dir_all(&nested).unwrap();
        let config = dir.path().join("cstyle.toml");
        fs::write(&config, "").unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, config);
    }

    #[test]
    fn test_nearer_file_wins_over_ancestor() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(".cstyle.toml"), "").unwrap();
        let near = nested.join("cstyle.toml");
        fs::write(&near, "").unwrap();

        assert_eq!(find_config_file(&nested).unwrap(), near);
    }

    #[test]
    fn test_candidate_order_within_one_dir() {
        let dir = TempDir::new().unwrap();
        let dotted = dir.path().join(".cstyle.toml");
        fs::write(&dotted, "").unwrap();
        fs::write(dir.path().join("cstyle.toml"), "").unwrap();

        assert_eq!(find_config_file(dir.path()).unwrap(), dotted);
    }

    #[test]
    fn test_none_when_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_config_file(dir.path()), None);
    }

    #[test]
    fn test_search_caches_hits() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join(".clang-format");
        fs::write(&config, "BasedOnStyle: LLVM\n").unwrap();

        let search = UpwardSearch::new([".clang-format"]);
        assert_eq!(search.find(dir.path()), Some(config.clone()));

        // The cached answer survives the file disappearing.
        fs::remove_file(&config).unwrap();
        assert_eq!(search.find(dir.path()), Some(config));
    }

    #[test]
    fn test_search_caches_misses() {
        let dir = TempDir::new().unwrap();
        let search = UpwardSearch::new([".clang-format"]);
        assert_eq!(search.find(dir.path()), None);

        fs::write(dir.path().join(".clang-format"), "").unwrap();
        assert_eq!(search.find(dir.path()), None);
    }

    #[test]
    fn test_search_caches_intermediate_dirs() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let config = dir.path().join(".clang-format");
        fs::write(&config, "").unwrap();

        let search = UpwardSearch::new([".clang-format"]);
        assert_eq!(search.find(&nested), Some(config.clone()));

        // The walk from `a/b` also primed the entry for `a`.
        fs::remove_file(&config).unwrap();
        assert_eq!(search.find(&nested.parent().unwrap()), Some(config));
    }
}
