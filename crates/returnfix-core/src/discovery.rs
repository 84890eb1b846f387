//! Discovery of request-handler source files.
//!
//! [`discover`] walks a root directory lazily and yields the paths whose file
//! name matches the configured globs. Entries are visited in file-name order,
//! so repeated runs over an unchanged tree yield the same sequence. Calling
//! `discover` again restarts the walk. A missing root yields nothing.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::error::{FixError, FixResult};

/// Directory names never descended into.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", "dist", "build", "coverage"];

/// Which files count as request-handler modules.
#[derive(Debug, Clone)]
pub struct FileFilter {
    globs: GlobSet,
    exclude_dirs: Vec<String>,
}

impl FileFilter {
    /// Build a filter from file-name globs (e.g. `*.controller.ts`).
    ///
    /// Hidden directories and [`DEFAULT_EXCLUDE_DIRS`] are always skipped.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> FixResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| FixError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
        }
        let globs = builder.build().map_err(|e| FixError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            reason: e.to_string(),
        })?;
        Ok(FileFilter {
            globs,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
        })
    }

    /// Add a directory name to skip.
    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.exclude_dirs.push(name.into());
        self
    }

    /// True if the file name of `path` matches one of the globs.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.globs.is_match(Path::new(name)))
    }

    /// True if a directory below the root should not be entered.
    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.') || self.exclude_dirs.iter().any(|d| *d == name)
    }
}

/// Lazily yield matching file paths under `root`, recursively.
pub fn discover<'a>(root: &Path, filter: &'a FileFilter) -> impl Iterator<Item = PathBuf> + 'a {
    let walk = root.is_dir().then(|| {
        WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !filter.is_excluded_dir(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| filter.matches(entry.path()))
            .map(DirEntry::into_path)
    });
    walk.into_iter().flatten()
}

// ============================================================================
// Tests
// ============================================================================
