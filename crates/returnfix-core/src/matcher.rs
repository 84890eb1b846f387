//! Locating exit-triggering calls that begin a statement.
//!
//! [`find_matches`] runs every [`PatternRule`] over the masked text, keeps the
//! calls that sit in statement position, and resolves overlaps so that only
//! the outermost call is reported. The result is ordered by position.
//!
//! ## Statement position
//!
//! Skipping spaces and tabs backwards from the call, the byte reached must be
//! the start of input, `{`, `}`, `;` or `)`, or end the word `else`.
//!
//! When it is a line break, the call starts a statement only if the previous
//! line also ended one. The previous significant byte (comments and literal
//! contents are blank in the masked text) must be one of `{ } ; ) ]`, a
//! closing quote or backtick, or the end of an identifier that is not an
//! expression keyword such as `await` or `typeof`. A line ending in an
//! operator, an opener, `,`, `=>`, `?` or `:` continues an expression, so
//! the call is left alone. `case x:` labels fall in that group and are not
//! rewritten.
//!
//! Anything else (`const x = res.json(...)`, `cb(next(err))`,
//! `cond ? a : res.json(b)`) is an expression position and is never touched.

use serde::Serialize;
use tracing::debug;

use crate::mask::{is_ident_byte, mask_code};
use crate::patch::Span;
use crate::rules::{InsertionPolicy, PatternRule, RuleKind};
use crate::text::offsets_to_positions;

/// Keywords after which a line break does not end the statement.
const EXPRESSION_KEYWORDS: &[&[u8]] = &[
    b"await",
    b"case",
    b"delete",
    b"extends",
    b"in",
    b"instanceof",
    b"new",
    b"of",
    b"throw",
    b"typeof",
    b"void",
    b"yield",
];

/// A located rule occurrence within a file's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Rule that fired.
    pub rule: RuleKind,
    /// Where the rule puts the keyword.
    #[serde(skip)]
    pub policy: InsertionPolicy,
    /// Outermost call, from its first byte to just past its argument list.
    pub call: Span,
    /// Horizontal whitespace immediately before the call. Never rewritten.
    pub indent: Span,
    /// 1-indexed line of the call start.
    pub line: u32,
    /// 1-indexed column of the call start.
    pub col: u32,
}

/// Find every statement-position match of `rules` in `text`.
pub fn find_matches(text: &str, rules: &[PatternRule]) -> Vec<Match> {
    let masked = mask_code(text);
    find_matches_masked(text, &masked, rules)
}

/// As [`find_matches`], reusing an already computed mask of `text`.
pub fn find_matches_masked(text: &str, masked: &[u8], rules: &[PatternRule]) -> Vec<Match> {
    let mut found = Vec::new();

    for rule in rules {
        for call in rule.candidates(masked) {
            let Some(indent) = statement_indent(masked, call.start) else {
                debug!(
                    rule = %rule.kind(),
                    offset = call.start,
                    "skipping call in expression position"
                );
                continue;
            };
            found.push(Match {
                rule: rule.kind(),
                policy: rule.policy(),
                call,
                indent,
                line: 0,
                col: 0,
            });
        }
    }

    // Outermost first at equal starts, then drop anything overlapping a kept match.
    found.sort_by_key(|m| (m.call.start, std::cmp::Reverse(m.call.end)));
    let mut matches: Vec<Match> = Vec::with_capacity(found.len());
    for m in found {
        if let Some(kept) = matches.last() {
            if kept.call.overlaps(&m.call) {
                debug!(
                    rule = %m.rule,
                    offset = m.call.start,
                    outer = %kept.rule,
                    nested = kept.call.contains(&m.call),
                    "dropping overlapping match"
                );
                continue;
            }
        }
        matches.push(m);
    }

    let starts: Vec<usize> = matches.iter().map(|m| m.call.start).collect();
    for (m, (line, col)) in matches.iter_mut().zip(offsets_to_positions(text, &starts)) {
        m.line = line;
        m.col = col;
    }
    matches
}

/// Return the indentation span before `pos` if `pos` starts a statement.
fn statement_indent(masked: &[u8], pos: usize) -> Option<Span> {
    let mut start = pos;
    while start > 0 && matches!(masked[start - 1], b' ' | b'\t') {
        start -= 1;
    }
    let indent = Span::new(start, pos);
    match start.checked_sub(1).map(|i| masked[i]) {
        None => Some(indent),
        Some(b'\n' | b'\r') => previous_line_ends_statement(masked, start).then_some(indent),
        Some(b'{' | b'}' | b';' | b')') => Some(indent),
        Some(_) if preceded_by_word(masked, start, b"else") => Some(indent),
        Some(_) => None,
    }
}

/// True if the last significant byte before `pos` closes a statement.
fn previous_line_ends_statement(masked: &[u8], pos: usize) -> bool {
    let Some(end) = masked[..pos].iter().rposition(|b| !b.is_ascii_whitespace()) else {
        return true;
    };
    match masked[end] {
        b'{' | b'}' | b';' | b')' | b']' | b'\'' | b'"' | b'`' => true,
        b if is_ident_byte(b) => !EXPRESSION_KEYWORDS
            .iter()
            .any(|kw| preceded_by_word(masked, end + 1, kw)),
        _ => false,
    }
}

/// True if the identifier ending at `end` is exactly `word`.
pub(crate) fn preceded_by_word(masked: &[u8], end: usize, word: &[u8]) -> bool {
    let Some(start) = end.checked_sub(word.len()) else {
        return false;
    };
    &masked[start..end] == word && (start == 0 || !is_ident_byte(masked[start - 1]))
}

// ============================================================================
// Tests
// ============================================================================
