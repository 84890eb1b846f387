//! One pass over a source tree.
//!
//! The engine wires discovery, the per-file pipeline and write-back together.
//! Files are processed one at a time, start to finish. Any error aborts the
//! pass; files already written stay written, and re-running is safe.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::FixConfig;
use crate::discovery::{discover, FileFilter};
use crate::error::FixResult;
use crate::output::{FixReport, FixedFile};
use crate::rules::PatternRule;
use crate::source::SourceFile;
use crate::writeback::write_if_changed;

/// Compiled configuration, ready to run.
#[derive(Debug)]
pub struct Engine {
    config: FixConfig,
    rules: Vec<PatternRule>,
    filter: FileFilter,
}

impl Engine {
    /// Compile globs and rules. Fails on an invalid pattern.
    pub fn new(config: FixConfig) -> FixResult<Self> {
        let rules = config.pattern_rules()?;
        let filter = config.file_filter()?;
        Ok(Engine {
            config,
            rules,
            filter,
        })
    }

    pub fn config(&self) -> &FixConfig {
        &self.config
    }

    /// Files the pass would visit, in order.
    pub fn candidates(&self) -> impl Iterator<Item = PathBuf> + '_ {
        discover(&self.config.root, &self.filter)
    }

    /// Run the in-memory pipeline over `text`. Nothing touches the disk.
    pub fn fix_text(
        &self,
        path: impl Into<PathBuf>,
        text: impl Into<String>,
    ) -> FixResult<SourceFile> {
        let mut file = SourceFile::new(path, text);
        file.fix(&self.rules, &self.config.keyword)?;
        Ok(file)
    }

    /// Read, fix and (unless dry-run) write one file.
    ///
    /// Returns the report entry if the file was, or would be, changed.
    pub fn process_file(&self, path: &Path) -> FixResult<Option<FixedFile>> {
        let mut file = SourceFile::read(path)?;
        file.fix(&self.rules, &self.config.keyword)?;
        debug!(
            path = %path.display(),
            matches = file.matches().len(),
            state = %file.state(),
            "scanned"
        );
        if !file.is_changed() {
            return Ok(None);
        }

        let fixed = FixedFile {
            path: path.to_path_buf(),
            insertions: file.insertions(),
            edits: file.line_edits(),
        };
        if !self.config.dry_run {
            write_if_changed(&mut file)?;
        }
        Ok(Some(fixed))
    }

    /// Run a full pass, calling `on_fixed` as each file is fixed.
    pub fn run_with(&self, mut on_fixed: impl FnMut(&FixedFile)) -> FixResult<FixReport> {
        let mut report = FixReport {
            dry_run: self.config.dry_run,
            ..FixReport::default()
        };
        for path in self.candidates() {
            report.files_scanned += 1;
            if let Some(fixed) = self.process_file(&path)? {
                on_fixed(&fixed);
                report.fixed.push(fixed);
            }
        }
        info!(
            root = %self.config.root.display(),
            scanned = report.files_scanned,
            fixed = report.fixed_count(),
            dry_run = report.dry_run,
            "pass complete"
        );
        Ok(report)
    }

    pub fn run(&self) -> FixResult<FixReport> {
        self.run_with(|_| {})
    }
}

// ============================================================================
// Tests
// ============================================================================
