//! Comment and string masking for JavaScript/TypeScript source.
//!
//! Pattern rules never look at raw file text. They scan the output of
//! [`mask_code`], a copy of the text with the same length in which every byte
//! of a comment, every byte inside a string or regex literal, and the literal
//! parts of template strings are replaced with a space. Newlines are kept, so
//! line numbers and byte offsets found in the masked copy apply unchanged to
//! the original text.
//!
//! ## Exclusion policy
//!
//! | Construct | Masked |
//! |-----------|--------|
//! | `// ...` and `/* ... */` | whole comment, delimiters included |
//! | `'...'` and `"..."` | contents; quotes stay visible |
//! | `` `...` `` | literal text; `${ ... }` substitutions stay code |
//! | `/.../flags` | contents, when `/` follows an operator or opening bracket |
//!
//! Regex literals are recognised by the preceding significant byte. A regex
//! that follows `)` or an identifier (for example `return /x/`) is read as
//! division; if such a regex contains a quote, masking of the rest of that
//! line can be off. This is a known limitation.

/// Bytes after which a `/` opens a regex literal rather than dividing.
const REGEX_PRECEDERS: &[u8] = b"(,=:[!&|?{};+-*%<>~^";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    LineComment,
    BlockComment,
    Quoted(u8),
    Template,
    Regex { in_class: bool },
}

fn regex_allowed(prev: Option<u8>) -> bool {
    match prev {
        None => true,
        Some(p) => REGEX_PRECEDERS.contains(&p),
    }
}

/// Blank `count` bytes starting at `at`, keeping newlines.
fn blank(out: &mut [u8], at: usize, count: usize) {
    let end = (at + count).min(out.len());
    for byte in &mut out[at..end] {
        if *byte != b'\n' {
            *byte = b' ';
        }
    }
}

/// Produce the masked copy of `text`.
pub fn mask_code(text: &str) -> Vec<u8> {
    let src = text.as_bytes();
    let mut out = src.to_vec();
    let mut mode = Mode::Code;
    // Brace depth in code, and the depth at which each open `${` was entered.
    let mut depth = 0usize;
    let mut substitutions: Vec<usize> = Vec::new();
    let mut prev: Option<u8> = None;
    let mut i = 0;

    while i < src.len() {
        let b = src[i];
        let next = src.get(i + 1).copied();

        match mode {
            Mode::Code => {
                match b {
                    b'/' if next == Some(b'/') => {
                        blank(&mut out, i, 2);
                        mode = Mode::LineComment;
                        i += 2;
                        continue;
                    }
                    b'/' if next == Some(b'*') => {
                        blank(&mut out, i, 2);
                        mode = Mode::BlockComment;
                        i += 2;
                        continue;
                    }
                    b'/' if regex_allowed(prev) => {
                        mode = Mode::Regex { in_class: false };
                    }
                    b'\'' | b'"' => mode = Mode::Quoted(b),
                    b'`' => mode = Mode::Template,
                    b'{' => depth += 1,
                    b'}' => {
                        depth = depth.saturating_sub(1);
                        if substitutions.last() == Some(&depth) {
                            substitutions.pop();
                            mode = Mode::Template;
                        }
                    }
                    _ => {}
                }
                if !b.is_ascii_whitespace() {
                    prev = Some(b);
                }
            }
            Mode::LineComment => {
                if b == b'\n' {
                    mode = Mode::Code;
                } else {
                    out[i] = b' ';
                }
            }
            Mode::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    blank(&mut out, i, 2);
                    mode = Mode::Code;
                    i += 2;
                    continue;
                }
                blank(&mut out, i, 1);
            }
            Mode::Quoted(quote) => {
                if b == b'\\' {
                    blank(&mut out, i, 2);
                    i += 2;
                    continue;
                }
                if b == quote {
                    mode = Mode::Code;
                    prev = Some(quote);
                } else if b == b'\n' {
                    // Unterminated string: resume code on the next line.
                    mode = Mode::Code;
                } else {
                    out[i] = b' ';
                }
            }
            Mode::Template => {
                if b == b'\\' {
                    blank(&mut out, i, 2);
                    i += 2;
                    continue;
                }
                if b == b'`' {
                    mode = Mode::Code;
                    prev = Some(b'`');
                } else if b == b'$' && next == Some(b'{') {
                    substitutions.push(depth);
                    depth += 1;
                    mode = Mode::Code;
                    prev = Some(b'{');
                    i += 2;
                    continue;
                } else {
                    blank(&mut out, i, 1);
                }
            }
            Mode::Regex { in_class } => {
                if b == b'\\' {
                    blank(&mut out, i, 2);
                    i += 2;
                    continue;
                }
                match b {
                    b'\n' => mode = Mode::Code,
                    b'/' if !in_class => {
                        mode = Mode::Code;
                        prev = Some(b'/');
                    }
                    b'[' => {
                        out[i] = b' ';
                        mode = Mode::Regex { in_class: true };
                    }
                    b']' => {
                        out[i] = b' ';
                        mode = Mode::Regex { in_class: false };
                    }
                    _ => out[i] = b' ',
                }
            }
        }
        i += 1;
    }

    out
}

/// True for bytes that can appear in a JS identifier (ASCII view).
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// Find the `)` matching the `(` at `open` in masked text.
///
/// All bracket kinds count toward nesting. Returns `None` when the group is
/// not closed before end of input.
pub fn matching_close(masked: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in masked.iter().enumerate().skip(open) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (b == b')').then_some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
