//! Unified diff generation for dry-run previews.

use std::collections::BTreeMap;

use serde::Serialize;

/// A single changed line, as shown in a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEdit {
    /// File path, as discovered.
    pub file: String,
    /// 1-indexed line number.
    pub line: u32,
    /// Line before the fix (no newline).
    pub old_text: String,
    /// Line after the fix (no newline).
    pub new_text: String,
}

/// Generate a unified diff from line edits.
///
/// Files appear in path order and each edit is a one-line hunk.
pub fn generate_unified_diff(edits: &[OutputEdit]) -> String {
    let mut by_file: BTreeMap<&str, Vec<&OutputEdit>> = BTreeMap::new();
    for edit in edits {
        by_file.entry(&edit.file).or_default().push(edit);
    }

    let mut diff = String::new();
    for (file, mut file_edits) in by_file {
        file_edits.sort_by_key(|e| e.line);
        diff.push_str(&format!("--- a/{}\n", file));
        diff.push_str(&format!("+++ b/{}\n", file));

        for edit in file_edits {
            diff.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                edit.line, 1, edit.line, 1
            ));
            diff.push_str(&format!("-{}\n", edit.old_text.trim_end_matches('\r')));
            diff.push_str(&format!("+{}\n", edit.new_text.trim_end_matches('\r')));
        }
    }

    diff
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(file: &str, line: u32, old: &str, new: &str) -> OutputEdit {
        OutputEdit {
            file: file.to_string(),
            line,
            old_text: old.to_string(),
            new_text: new.to_string(),
        }
    }

    #[test]
    fn single_edit() {
        let diff = generate_unified_diff(&[edit(
            "src/modules/users/users.controller.ts",
            9,
            "    next(error);",
            "    return next(error);",
        )]);
        assert_eq!(
            diff,
            "--- a/src/modules/users/users.controller.ts\n\
             +++ b/src/modules/users/users.controller.ts\n\
             @@ -9,1 +9,1 @@\n\
             -    next(error);\n\
             +    return next(error);\n"
        );
    }

    #[test]
    fn multiple_edits_same_file_share_header() {
        let diff = generate_unified_diff(&[
            edit("a.ts", 7, "res.json(b);", "return res.json(b);"),
            edit("a.ts", 3, "res.json(a);", "return res.json(a);"),
        ]);
        assert_eq!(diff.matches("--- a/a.ts").count(), 1);
        assert_eq!(diff.matches("@@ -").count(), 2);
        assert!(diff.find("@@ -3,1").unwrap() < diff.find("@@ -7,1").unwrap());
    }

    #[test]
    fn files_in_path_order() {
        let diff = generate_unified_diff(&[
            edit("b.ts", 1, "x", "y"),
            edit("a.ts", 1, "x", "y"),
        ]);
        assert!(diff.find("--- a/a.ts").unwrap() < diff.find("--- a/b.ts").unwrap());
    }

    #[test]
    fn carriage_returns_are_not_echoed() {
        let diff = generate_unified_diff(&[edit("a.ts", 2, "  next();\r", "  return next();\r")]);
        assert!(diff.contains("-  next();\n"));
        assert!(diff.contains("+  return next();\n"));
    }

    #[test]
    fn empty_edits_empty_diff() {
        assert_eq!(generate_unified_diff(&[]), "");
    }
}
