//! Patch primitives: spans, content hashes and insertion edits.
//!
//! Every rewrite returnfix performs compiles down to a list of [`Insertion`]s
//! against one file's text. Insertions are applied in descending position
//! order so that each one leaves the offsets of the ones still pending valid.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Hash type for content verification (SHA-256, stored as hex string for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Span
// ============================================================================

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Insertions
// ============================================================================

/// Insert `text` at an absolute byte position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Byte offset where the new text begins.
    pub position: usize,
    /// Text to insert.
    pub text: String,
}

impl Insertion {
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Insertion {
            position,
            text: text.into(),
        }
    }
}

/// Errors raised when an insertion plan does not fit the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// Two insertions target the same offset.
    #[error("duplicate insertion at byte {position}")]
    DuplicatePosition { position: usize },

    /// Insertion lies past the end of the text.
    #[error("insertion at byte {position} is beyond text length {len}")]
    OutOfBounds { position: usize, len: usize },

    /// Insertion would split a multi-byte character.
    #[error("insertion at byte {position} is not on a char boundary")]
    NotCharBoundary { position: usize },
}

/// Apply insertions to `source`, returning the new text.
///
/// Insertions are validated first, then applied from the highest position
/// down. An empty plan returns the source unchanged.
pub fn apply_insertions(source: &str, insertions: &[Insertion]) -> Result<String, PatchError> {
    let mut ordered: Vec<&Insertion> = insertions.iter().collect();
    ordered.sort_by(|a, b| b.position.cmp(&a.position));

    for pair in ordered.windows(2) {
        if pair[0].position == pair[1].position {
            return Err(PatchError::DuplicatePosition {
                position: pair[0].position,
            });
        }
    }
    for ins in &ordered {
        if ins.position > source.len() {
            return Err(PatchError::OutOfBounds {
                position: ins.position,
                len: source.len(),
            });
        }
        if !source.is_char_boundary(ins.position) {
            return Err(PatchError::NotCharBoundary {
                position: ins.position,
            });
        }
    }

    let extra: usize = ordered.iter().map(|i| i.text.len()).sum();
    let mut result = String::with_capacity(source.len() + extra);
    result.push_str(source);
    for ins in ordered {
        result.insert_str(ins.position, &ins.text);
    }
    Ok(result)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod span_tests {
        use super::*;

        #[test]
        fn span_creation() {
            let span = Span::new(4, 10);
            assert_eq!(span.len(), 6);
            assert!(!span.is_empty());
            assert!(Span::new(3, 3).is_empty());
        }

        #[test]
        #[should_panic(expected = "must be <= end")]
        fn span_new_invalid_range_panics() {
            let _ = Span::new(5, 2);
        }

        #[test]
        fn span_overlap_detection() {
            let a = Span::new(0, 10);
            assert!(a.overlaps(&Span::new(5, 15)));
            assert!(!a.overlaps(&Span::new(10, 20)));
            assert!(a.contains(&Span::new(2, 8)));
            assert!(!a.contains(&Span::new(8, 12)));
        }
    }

    mod hash_tests {
        use super::*;

        #[test]
        fn content_hash_is_hex_sha256() {
            let hash = ContentHash::compute(b"next(error);");
            assert_eq!(hash.0.len(), 64);
            assert!(hash.0.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(hash, ContentHash::compute(b"next(error);"));
            assert_ne!(hash, ContentHash::compute(b"return next(error);"));
        }
    }

    mod apply_tests {
        use super::*;

        #[test]
        fn applies_multiple_insertions_in_reverse_order() {
            let source = "  next(error);\n  res.json(x);\n";
            let plan = vec![
                Insertion::new(2, "return "),
                Insertion::new(17, "return "),
            ];
            let result = apply_insertions(source, &plan).unwrap();
            assert_eq!(result, "  return next(error);\n  return res.json(x);\n");
        }

        #[test]
        fn plan_order_does_not_matter() {
            let source = "ab";
            let forward = vec![Insertion::new(0, "<"), Insertion::new(2, ">")];
            let backward = vec![Insertion::new(2, ">"), Insertion::new(0, "<")];
            assert_eq!(apply_insertions(source, &forward).unwrap(), "<ab>");
            assert_eq!(apply_insertions(source, &backward).unwrap(), "<ab>");
        }

        #[test]
        fn empty_plan_is_identity() {
            assert_eq!(apply_insertions("unchanged", &[]).unwrap(), "unchanged");
        }

        #[test]
        fn duplicate_position_rejected() {
            let plan = vec![Insertion::new(1, "x"), Insertion::new(1, "y")];
            assert_eq!(
                apply_insertions("abc", &plan),
                Err(PatchError::DuplicatePosition { position: 1 })
            );
        }

        #[test]
        fn out_of_bounds_rejected() {
            let plan = vec![Insertion::new(9, "x")];
            assert_eq!(
                apply_insertions("abc", &plan),
                Err(PatchError::OutOfBounds {
                    position: 9,
                    len: 3
                })
            );
        }

        #[test]
        fn char_boundary_enforced() {
            // 'é' is two bytes; offset 1 falls inside it.
            let plan = vec![Insertion::new(1, "x")];
            assert_eq!(
                apply_insertions("é", &plan),
                Err(PatchError::NotCharBoundary { position: 1 })
            );
        }
    }
}
