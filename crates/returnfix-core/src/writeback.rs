//! Persisting rewritten files.
//!
//! A file is written only when its text changed. The new content goes to a
//! temporary file in the same directory, which then replaces the original in
//! one rename, so an interrupted run leaves either the old or the new text.
//! The file's permissions are carried over. If the file on disk no longer
//! hashes to what was read, nothing is written.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{FixError, FixResult};
use crate::patch::ContentHash;
use crate::source::SourceFile;

/// What write-back did with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Text unchanged; the file was not touched.
    Unchanged,
    /// New text persisted.
    Written,
}

/// Persist `file` if rewriting changed it.
pub fn write_if_changed(file: &mut SourceFile) -> FixResult<WriteOutcome> {
    let Some(text) = file.rewritten().filter(|_| file.is_changed()) else {
        debug!(path = %file.path().display(), "unchanged, not writing");
        return Ok(WriteOutcome::Unchanged);
    };

    let path = file.path();
    let on_disk = fs::read(path).map_err(|e| FixError::io(path, e))?;
    if ContentHash::compute(&on_disk) != *file.original_hash() {
        return Err(FixError::ConcurrentModification {
            path: path.to_path_buf(),
        });
    }

    replace_atomically(path, text.as_bytes())?;
    info!(path = %path.display(), "wrote file");
    file.mark_written();
    Ok(WriteOutcome::Written)
}

/// Replace `path` with `contents` via a sibling temp file and rename.
fn replace_atomically(path: &Path, contents: &[u8]) -> FixResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)
        .map_err(|e| FixError::io(path, e))?
        .permissions();

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FixError::io(dir, e))?;
    tmp.write_all(contents).map_err(|e| FixError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| FixError::io(tmp.path(), e))?;
    fs::set_permissions(tmp.path(), permissions).map_err(|e| FixError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| FixError::io(path, e.error))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
