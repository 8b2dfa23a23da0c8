//! Glob-driven file discovery over a level directory.
//!
//! Matches are reported pattern by pattern, each pattern's hits in
//! lexicographic relative-path order. A file reachable through several
//! patterns (or several paths) is reported once, keyed by canonical path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use log::{debug, warn};
use walkdir::WalkDir;

/// A compiled, ordered list of case-insensitive glob patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    matchers: Vec<GlobMatcher>,
}

impl PatternSet {
    /// Compile patterns. Invalid patterns are logged and dropped.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let matchers = patterns
            .iter()
            .filter_map(|p| {
                let p = p.as_ref();
                match GlobBuilder::new(p)
                    .case_insensitive(true)
                    .literal_separator(true)
                    .build()
                {
                    Ok(glob) => Some(glob.compile_matcher()),
                    Err(e) => {
                        warn!("Ignoring invalid glob pattern {p:?}: {e}");
                        None
                    }
                }
            })
            .collect();
        Self { matchers }
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// True if any pattern matches the `/`-separated relative path.
    pub fn matches(&self, relative: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(relative))
    }
}

/// A regular file under the walk root.
#[derive(Debug, Clone)]
struct WalkedFile {
    relative: String,
    path: PathBuf,
}

/// Relative path with `/` separators regardless of platform.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

fn walk_files(root: &Path) -> Vec<WalkedFile> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        match relative_slash_path(root, &path) {
            Some(relative) => files.push(WalkedFile { relative, path }),
            None => debug!("Skipping non-UTF-8 path {}", path.display()),
        }
    }
    files
}

/// Find files under `root` matching `patterns`, deduplicated by canonical path.
///
/// Ordering: all hits of the first pattern, then new hits of the second,
/// and so on; within a pattern, lexicographic by relative path.
pub fn discover_files<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Vec<PathBuf> {
    if !root.is_dir() {
        warn!("Level directory {} does not exist", root.display());
        return Vec::new();
    }

    let patterns = PatternSet::new(patterns);
    let mut files = walk_files(root);
    files.sort_by(|a, b| a.relative.cmp(&b.relative));

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for matcher in &patterns.matchers {
        for file in files.iter().filter(|f| matcher.is_match(&f.relative)) {
            let key = std::fs::canonicalize(&file.path).unwrap_or_else(|_| file.path.clone());
            if seen.insert(key) {
                found.push(file.path.clone());
            } else {
                debug!("Already visited {}", file.relative);
            }
        }
    }
    found
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
