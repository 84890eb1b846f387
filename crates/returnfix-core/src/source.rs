//! Per-file pipeline state.
//!
//! A [`SourceFile`] is read once, scanned, guarded and rewritten in memory,
//! then handed to [`crate::writeback`]. Nothing about it outlives the run.
//!
//! ```text
//! Loaded -> Matched -> Guarded -> Unchanged
//!                              -> Rewritten -> Written
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::diff::OutputEdit;
use crate::error::{FixError, FixResult};
use crate::guard::filter_guarded;
use crate::mask::mask_code;
use crate::matcher::{find_matches_masked, Match};
use crate::patch::ContentHash;
use crate::rewrite::rewrite;
use crate::rules::{PatternRule, RuleKind};

/// Where a file is in the per-file pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    /// Text read, not yet scanned.
    Loaded,
    /// Candidate matches located.
    Matched,
    /// Matches that already have the keyword dropped.
    Guarded,
    /// Terminal: nothing to insert.
    Unchanged,
    /// New text computed, not yet persisted.
    Rewritten,
    /// Terminal: new text persisted.
    Written,
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileState::Loaded => "loaded",
            FileState::Matched => "matched",
            FileState::Guarded => "guarded",
            FileState::Unchanged => "unchanged",
            FileState::Rewritten => "rewritten",
            FileState::Written => "written",
        };
        f.write_str(name)
    }
}

/// Where one keyword was inserted, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertionRecord {
    pub rule: RuleKind,
    pub line: u32,
    pub col: u32,
}

/// One request-handler file moving through the pipeline.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    original: String,
    original_hash: ContentHash,
    masked: Vec<u8>,
    matches: Vec<Match>,
    rewritten: Option<String>,
    state: FileState,
}

impl SourceFile {
    /// Wrap already-loaded text.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let original = text.into();
        SourceFile {
            path: path.into(),
            original_hash: ContentHash::compute(original.as_bytes()),
            original,
            masked: Vec::new(),
            matches: Vec::new(),
            rewritten: None,
            state: FileState::Loaded,
        }
    }

    /// Read `path` from disk.
    pub fn read(path: &Path) -> FixResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| FixError::io(path, e))?;
        Ok(SourceFile::new(path, text))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Hash of the text as read.
    pub fn original_hash(&self) -> &ContentHash {
        &self.original_hash
    }

    pub fn state(&self) -> FileState {
        self.state
    }

    /// Current matches (all candidates after `find`, unguarded ones after `guard`).
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// The rewritten text, once [`SourceFile::rewrite`] produced a change.
    pub fn rewritten(&self) -> Option<&str> {
        self.rewritten.as_deref()
    }

    /// True if rewriting produced text different from the original.
    pub fn is_changed(&self) -> bool {
        self.rewritten
            .as_deref()
            .is_some_and(|text| text != self.original)
    }

    /// Loaded -> Matched.
    pub fn find(&mut self, rules: &[PatternRule]) {
        self.masked = mask_code(&self.original);
        self.matches = find_matches_masked(&self.original, &self.masked, rules);
        self.state = FileState::Matched;
    }

    /// Matched -> Guarded.
    pub fn guard(&mut self, rules: &[PatternRule], keyword: &str) {
        let matches = std::mem::take(&mut self.matches);
        self.matches = filter_guarded(&self.masked, matches, rules, keyword);
        self.state = FileState::Guarded;
    }

    /// Guarded -> Unchanged | Rewritten.
    pub fn rewrite(&mut self, keyword: &str) -> FixResult<()> {
        if self.matches.is_empty() {
            self.state = FileState::Unchanged;
            return Ok(());
        }
        let text = rewrite(&self.original, &self.matches, keyword)?;
        if text == self.original {
            self.state = FileState::Unchanged;
        } else {
            self.rewritten = Some(text);
            self.state = FileState::Rewritten;
        }
        Ok(())
    }

    /// Run find, guard and rewrite in order.
    pub fn fix(&mut self, rules: &[PatternRule], keyword: &str) -> FixResult<()> {
        self.find(rules);
        self.guard(rules, keyword);
        self.rewrite(keyword)
    }

    /// Rewritten -> Written. Called by write-back after persisting.
    pub(crate) fn mark_written(&mut self) {
        self.state = FileState::Written;
    }

    /// Insertion points, in text order.
    pub fn insertions(&self) -> Vec<InsertionRecord> {
        if !self.is_changed() {
            return Vec::new();
        }
        self.matches
            .iter()
            .map(|m| InsertionRecord {
                rule: m.rule,
                line: m.line,
                col: m.col,
            })
            .collect()
    }

    /// Line-level edits between original and rewritten text.
    ///
    /// Insertions never add or remove newlines, so lines pair up one to one.
    pub fn line_edits(&self) -> Vec<OutputEdit> {
        let Some(rewritten) = self.rewritten.as_deref() else {
            return Vec::new();
        };
        let file = self.path.to_string_lossy().into_owned();
        self.original
            .split('\n')
            .zip(rewritten.split('\n'))
            .enumerate()
            .filter(|(_, (old, new))| old != new)
            .map(|(idx, (old, new))| OutputEdit {
                file: file.clone(),
                line: idx as u32 + 1,
                old_text: old.to_string(),
                new_text: new.to_string(),
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
