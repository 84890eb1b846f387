//! Run configuration.
//!
//! The defaults reproduce the fixed behaviour of the tool: scan `src/modules`
//! for `*.controller.ts` files, apply both rules, insert `return`, write back.

use std::path::{Path, PathBuf};

use crate::discovery::FileFilter;
use crate::error::FixResult;
use crate::rewrite::KEYWORD;
use crate::rules::{rules_for, PatternRule, RuleKind};

/// Directory scanned when no root is given.
pub const DEFAULT_ROOT: &str = "src/modules";

/// File-name glob for request-handler modules.
pub const DEFAULT_PATTERN: &str = "*.controller.ts";

/// Settings for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixConfig {
    /// Directory to walk.
    pub root: PathBuf,
    /// File-name globs; a file matching any of them is processed.
    pub patterns: Vec<String>,
    /// Keyword inserted before each unguarded call.
    pub keyword: String,
    /// Compute fixes without writing them.
    pub dry_run: bool,
    /// Rules to apply, in reporting order.
    pub rules: Vec<RuleKind>,
}

impl Default for FixConfig {
    fn default() -> Self {
        FixConfig {
            root: PathBuf::from(DEFAULT_ROOT),
            patterns: vec![DEFAULT_PATTERN.to_string()],
            keyword: KEYWORD.to_string(),
            dry_run: false,
            rules: RuleKind::ALL.to_vec(),
        }
    }
}

impl FixConfig {
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }

    /// Replace the globs. An empty list keeps the default.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        if !patterns.is_empty() {
            self.patterns = patterns;
        }
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Restrict the rule set. An empty list keeps all rules.
    pub fn with_rules(mut self, rules: &[RuleKind]) -> Self {
        if !rules.is_empty() {
            let mut rules = rules.to_vec();
            rules.sort();
            rules.dedup();
            self.rules = rules;
        }
        self
    }

    /// Compile the configured globs.
    pub fn file_filter(&self) -> FixResult<FileFilter> {
        FileFilter::new(&self.patterns)
    }

    /// Compile the configured rules.
    pub fn pattern_rules(&self) -> FixResult<Vec<PatternRule>> {
        rules_for(&self.rules)
    }
}
