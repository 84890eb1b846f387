//! Rewriter: insert the keyword before each unguarded match.

use crate::matcher::Match;
use crate::patch::{apply_insertions, Insertion, PatchError};

/// Control-flow keyword inserted before exit-triggering calls.
pub const KEYWORD: &str = "return";

/// One insertion of `"<keyword> "` per match, placed by the match's policy.
///
/// The indentation span recorded in each match lies before the insertion point
/// and is never part of an edit.
pub fn plan_insertions(matches: &[Match], keyword: &str) -> Vec<Insertion> {
    let text = format!("{} ", keyword);
    matches
        .iter()
        .map(|m| Insertion::new(m.policy.position(&m.call), &text))
        .collect()
}

/// Produce the rewritten text. With no matches, the result equals `text`.
pub fn rewrite(text: &str, matches: &[Match], keyword: &str) -> Result<String, PatchError> {
    apply_insertions(text, &plan_insertions(matches, keyword))
}

// ============================================================================
// Tests
// ============================================================================
