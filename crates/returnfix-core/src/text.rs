//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, not bytes

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
///
/// If `offset` exceeds content length, returns the position at end of content.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    offsets_to_positions(content, &[offset])
        .pop()
        .unwrap_or((1, 1))
}

/// Convert ascending byte offsets to positions in one pass over `content`.
///
/// The result has one entry per offset, in the same order.
pub fn offsets_to_positions(content: &str, offsets: &[usize]) -> Vec<(u32, u32)> {
    debug_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    let mut positions = Vec::with_capacity(offsets.len());
    let mut chars = content.char_indices().peekable();
    let mut line = 1u32;
    let mut col = 1u32;

    for &offset in offsets {
        while let Some(&(i, ch)) = chars.peek() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
            chars.next();
        }
        positions.push((line, col));
    }

    positions
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_to_position_simple() {
        let content = "line1\nline2\nline3\n";
        assert_eq!(byte_offset_to_position(content, 0), (1, 1));
        assert_eq!(byte_offset_to_position(content, 4), (1, 5));
        assert_eq!(byte_offset_to_position(content, 6), (2, 1));
        assert_eq!(byte_offset_to_position(content, 12), (3, 1));
    }

    #[test]
    fn offset_to_position_counts_chars() {
        // "é" is two bytes but one column.
        let content = "é next();";
        assert_eq!(byte_offset_to_position(content, 3), (1, 3));
    }

    #[test]
    fn offset_beyond_content() {
        assert_eq!(byte_offset_to_position("short", 100), (1, 6));
    }

    #[test]
    fn many_offsets_in_one_pass() {
        let content = "a\nbé\nc";
        assert_eq!(
            offsets_to_positions(content, &[0, 2, 3, 3, 6, 50]),
            vec![(1, 1), (2, 1), (2, 2), (2, 2), (3, 1), (3, 2)]
        );
    }

    #[test]
    fn no_offsets() {
        assert!(offsets_to_positions("abc", &[]).is_empty());
    }
}
