//! Pattern rules: the exit-triggering call shapes returnfix repairs.
//!
//! A [`PatternRule`] pairs a matcher with an insertion policy and the lookback
//! window its idempotence guard uses. Rules are static configuration; the two
//! shapes below are the only ones recognised. Any other early-exit shape
//! (`throw`, `res.send(...)`, `res.redirect(...)`) is left alone.
//!
//! | Rule | Shape | Lookback |
//! |------|-------|----------|
//! | `forward-error` | `next(error);`, `next(err);`, `next();` | 30 bytes |
//! | `emit-json` | `res.json(...)`, `res.status(...).json(...)` | 20 bytes |
//!
//! Rules scan masked text (see [`crate::mask`]) and report call spans only;
//! statement-position checks and overlap resolution live in
//! [`crate::matcher`].

use std::fmt;
use std::str::FromStr;

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FixError, FixResult};
use crate::mask::matching_close;
use crate::patch::Span;

/// Lookback window for the forward-error guard.
pub const FORWARD_ERROR_LOOKBACK: usize = 30;

/// Lookback window for the emit-json guard.
pub const EMIT_JSON_LOOKBACK: usize = 20;

/// `next(<ident>?)` ending the statement. The `call` group excludes the terminator.
const FORWARD_ERROR_PATTERN: &str =
    r"(?P<call>\bnext\s*\(\s*(?:[A-Za-z_$][A-Za-z0-9_$]*\s*)?\))[ \t]*(?:;|\r?\n|\}|$)";

/// `res.json(` or `res.status(`; the status form must continue with `.json(`.
const EMIT_JSON_HEAD: &str = r"\bres\s*\.\s*(?P<method>status|json)\s*\(";

/// `.json(` directly after the status call's closing paren.
const EMIT_JSON_CHAIN: &str = r"^\s*\.\s*json\s*\(";

/// Which exit-triggering call shape a rule recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Forwarding an error to the next handler.
    ForwardError,
    /// Serializing and sending a JSON response body.
    EmitJson,
}

impl RuleKind {
    /// Every rule kind, in reporting order.
    pub const ALL: [RuleKind; 2] = [RuleKind::ForwardError, RuleKind::EmitJson];

    /// Stable name used in logs and JSON output.
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::ForwardError => "forward-error",
            RuleKind::EmitJson => "emit-json",
        }
    }

    /// Default guard lookback window in bytes.
    pub fn default_lookback(self) -> usize {
        match self {
            RuleKind::ForwardError => FORWARD_ERROR_LOOKBACK,
            RuleKind::EmitJson => EMIT_JSON_LOOKBACK,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKind {
    type Err = FixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FixError::InvalidRule {
                rule: s.to_string(),
                reason: "expected forward-error or emit-json".to_string(),
            })
    }
}

/// Where the keyword goes relative to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPolicy {
    /// Immediately before the outermost call token, after any indentation.
    BeforeCallStart,
}

impl InsertionPolicy {
    /// Byte offset at which the keyword is inserted for `call`.
    pub fn position(self, call: &Span) -> usize {
        match self {
            InsertionPolicy::BeforeCallStart => call.start,
        }
    }
}

/// One exit-triggering call shape: matcher, insertion policy, guard window.
#[derive(Debug, Clone)]
pub struct PatternRule {
    kind: RuleKind,
    head: Regex,
    chain: Option<Regex>,
    policy: InsertionPolicy,
    lookback: usize,
}

fn compile(kind: RuleKind, pattern: &str) -> FixResult<Regex> {
    Regex::new(pattern).map_err(|e| FixError::InvalidRule {
        rule: kind.name().to_string(),
        reason: e.to_string(),
    })
}

impl PatternRule {
    /// Rule A: `next(error);` and friends.
    pub fn forward_error() -> FixResult<Self> {
        let kind = RuleKind::ForwardError;
        Ok(PatternRule {
            kind,
            head: compile(kind, FORWARD_ERROR_PATTERN)?,
            chain: None,
            policy: InsertionPolicy::BeforeCallStart,
            lookback: kind.default_lookback(),
        })
    }

    /// Rule B: `res.json(...)` and `res.status(...).json(...)`.
    pub fn emit_json() -> FixResult<Self> {
        let kind = RuleKind::EmitJson;
        Ok(PatternRule {
            kind,
            head: compile(kind, EMIT_JSON_HEAD)?,
            chain: Some(compile(kind, EMIT_JSON_CHAIN)?),
            policy: InsertionPolicy::BeforeCallStart,
            lookback: kind.default_lookback(),
        })
    }

    /// Build the rule for `kind`.
    pub fn for_kind(kind: RuleKind) -> FixResult<Self> {
        match kind {
            RuleKind::ForwardError => Self::forward_error(),
            RuleKind::EmitJson => Self::emit_json(),
        }
    }

    /// Override the guard lookback window.
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn policy(&self) -> InsertionPolicy {
        self.policy
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Spans of every call this rule recognises in `masked`, in text order.
    ///
    /// A span runs from the first byte of the outermost call to just past its
    /// closing paren, or just past the opening paren if the argument list is
    /// never closed.
    pub fn candidates(&self, masked: &[u8]) -> Vec<Span> {
        match self.kind {
            RuleKind::ForwardError => self
                .head
                .captures_iter(masked)
                .filter_map(|caps| caps.name("call"))
                .map(|call| Span::new(call.start(), call.end()))
                .collect(),
            RuleKind::EmitJson => self.emit_json_candidates(masked),
        }
    }

    fn emit_json_candidates(&self, masked: &[u8]) -> Vec<Span> {
        let mut spans = Vec::new();
        for caps in self.head.captures_iter(masked) {
            let (Some(whole), Some(method)) = (caps.get(0), caps.name("method")) else {
                continue;
            };
            let open = whole.end() - 1;
            let json_open = if method.as_bytes() == b"json" {
                open
            } else {
                // res.status(...) only counts when chained into .json(
                let Some(close) = matching_close(masked, open) else {
                    continue;
                };
                let rest = &masked[close + 1..];
                match self.chain.as_ref().and_then(|chain| chain.find(rest)) {
                    Some(m) => close + m.end(),
                    None => continue,
                }
            };
            let end = matching_close(masked, json_open).map_or(json_open + 1, |c| c + 1);
            spans.push(Span::new(whole.start(), end));
        }
        spans
    }
}

/// Both required rules with their default lookback windows.
pub fn default_rules() -> FixResult<Vec<PatternRule>> {
    rules_for(&RuleKind::ALL)
}

/// Build rules for the given kinds, in the given order.
pub fn rules_for(kinds: &[RuleKind]) -> FixResult<Vec<PatternRule>> {
    kinds.iter().map(|&kind| PatternRule::for_kind(kind)).collect()
}

// ============================================================================
// Tests
// ============================================================================
