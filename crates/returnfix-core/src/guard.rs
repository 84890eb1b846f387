//! Idempotence guard: drop matches that already have the keyword.
//!
//! The guard looks at a bounded window of masked text before a match. The
//! window ends at the last non-whitespace byte before the call, so indentation
//! and line breaks never use up its budget. It is clipped at the last `;`, `{` or `}` it contains, so a
//! keyword belonging to a previous statement never counts, and the keyword
//! must appear as a whole word (`returned` does not count). Line breaks are
//! not clip points: `return` wrapped onto the line above still guards the
//! call.
//!
//! Window sizes come from [`crate::rules`]: 30 bytes for forward-error and 20
//! bytes for emit-json. Comments are blank in the masked text and are skipped
//! along with the whitespace.

use tracing::debug;

use crate::mask::is_ident_byte;
use crate::matcher::Match;
use crate::rules::PatternRule;

/// Bytes that end the previous statement inside a lookback window.
const STATEMENT_BOUNDARIES: &[u8] = b";{}";

/// Whether `keyword` already appears in the lookback window before `m`.
pub fn is_guarded(masked: &[u8], m: &Match, keyword: &str, lookback: usize) -> bool {
    let mut end = m.call.start.min(masked.len());
    while end > 0 && masked[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    let mut start = end.saturating_sub(lookback);
    if let Some(boundary) = masked[start..end]
        .iter()
        .rposition(|b| STATEMENT_BOUNDARIES.contains(b))
    {
        start += boundary + 1;
    }
    contains_word(masked, start, end, keyword.as_bytes())
}

/// Remove guarded matches, using each rule's own lookback window.
pub fn filter_guarded(
    masked: &[u8],
    matches: Vec<Match>,
    rules: &[PatternRule],
    keyword: &str,
) -> Vec<Match> {
    matches
        .into_iter()
        .filter(|m| {
            let lookback = rules
                .iter()
                .find(|r| r.kind() == m.rule)
                .map_or_else(|| m.rule.default_lookback(), |r| r.lookback());
            let guarded = is_guarded(masked, m, keyword, lookback);
            if guarded {
                debug!(rule = %m.rule, line = m.line, "already guarded");
            }
            !guarded
        })
        .collect()
}

/// Whole-word search for `word` within `masked[start..end]`.
///
/// Word boundaries are checked against the full text, not the window.
fn contains_word(masked: &[u8], start: usize, end: usize, word: &[u8]) -> bool {
    if word.is_empty() || end < start + word.len() {
        return false;
    }
    (start..=end - word.len()).any(|i| {
        &masked[i..i + word.len()] == word
            && (i == 0 || !is_ident_byte(masked[i - 1]))
            && !matches!(masked.get(i + word.len()), Some(&b) if is_ident_byte(b))
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::mask_code;
    use crate::patch::Span;
    use crate::rules::{default_rules, InsertionPolicy, RuleKind, EMIT_JSON_LOOKBACK};

    /// A match for the first occurrence of `call` in `text`.
    fn match_at(text: &str, call: &str, rule: RuleKind) -> Match {
        let start = text.find(call).unwrap();
        Match {
            rule,
            policy: InsertionPolicy::BeforeCallStart,
            call: Span::new(start, start + call.len()),
            indent: Span::new(start, start),
            line: 1,
            col: 1,
        }
    }

    fn guarded(text: &str, call: &str, lookback: usize) -> bool {
        let m = match_at(text, call, RuleKind::ForwardError);
        is_guarded(&mask_code(text), &m, "return", lookback)
    }

    fn guarded_json(text: &str, call: &str) -> bool {
        let m = match_at(text, call, RuleKind::EmitJson);
        is_guarded(&mask_code(text), &m, "return", EMIT_JSON_LOOKBACK)
    }

    #[test]
    fn keyword_directly_before_call_is_guarded() {
        assert!(guarded("  return next(error);", "next(error)", 30));
    }

    #[test]
    fn bare_call_is_not_guarded() {
        assert!(!guarded("  next(error);", "next(error)", 30));
    }

    #[test]
    fn keyword_on_previous_line_is_guarded() {
        assert!(guarded("    return\n      next(error);", "next(error)", 30));
    }

    #[test]
    fn keyword_from_previous_statement_does_not_guard() {
        assert!(!guarded("return;\n  }\n  next(error);", "next(error)", 30));
        assert!(!guarded("if (x) return; next(error);", "next(error)", 30));
    }

    #[test]
    fn identifier_containing_keyword_does_not_guard() {
        assert!(!guarded("{ returned\n next(error);", "next(error)", 30));
        assert!(!guarded("{ noreturn\n next(error);", "next(error)", 30));
    }

    #[test]
    fn keyword_in_comment_does_not_guard() {
        assert!(!guarded("{ /* return */ next(error);", "next(error)", 30));
    }

    #[test]
    fn keyword_outside_window_is_missed() {
        let text = "return wrap(alpha, beta, gamma,\n    next(error)";
        assert!(!guarded(text, "next(error)", 20));
        assert!(guarded(text, "next(error)", 60));
    }

    #[test]
    fn deep_indentation_does_not_use_up_window() {
        let text = "        return (\n            res.json(x)\n        );";
        assert!(guarded_json(text, "res.json(x)"));
        let tabs = format!("\treturn (\n{}res.json(x)\n\t);", "\t".repeat(24));
        assert!(guarded_json(&tabs, "res.json(x)"));
    }

    #[test]
    fn blank_lines_and_comments_between_keyword_and_call() {
        let text = "  return /* forwarded to the error handler */\n\n\n      next(error);";
        assert!(guarded(text, "next(error)", 30));
    }

    #[test]
    fn whitespace_skip_stops_at_previous_statement() {
        assert!(!guarded("  return;\n\n          next(error);", "next(error)", 30));
    }

    #[test]
    fn filter_drops_only_guarded_matches() {
        let text = "  return res.json(a);\n  res.json(b);\n";
        let masked = mask_code(text);
        let first = match_at(text, "res.json(a)", RuleKind::EmitJson);
        let second = match_at(text, "res.json(b)", RuleKind::EmitJson);
        let rules = default_rules().unwrap();
        let kept = filter_guarded(&masked, vec![first, second.clone()], &rules, "return");
        assert_eq!(kept, vec![second]);
    }

    #[test]
    fn contains_word_edges() {
        assert!(contains_word(b"return", 0, 6, b"return"));
        assert!(!contains_word(b"retur", 0, 5, b"return"));
        assert!(!contains_word(b"x", 0, 1, b""));
    }
}
