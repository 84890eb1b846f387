//! Error types and error code constants for returnfix.
//!
//! `FixError` is the single error type surfaced by the engine. Every failure is
//! fatal to the run: the tool is an offline, re-runnable maintenance pass, so
//! there is no retry or per-file isolation.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad glob pattern, bad rule configuration)
//! - `4`: Apply errors (failed to read or write a file, stale content)
//! - `10`: Internal errors (edit plan inconsistencies)
//!
//! "No matches" and "root directory missing" are not errors.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::patch::PatchError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad pattern, bad configuration).
    InvalidArguments = 2,
    /// Failed to read or write a source file.
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Stable name used in JSON error responses.
    pub fn name(&self) -> &'static str {
        match self {
            OutputErrorCode::InvalidArguments => "InvalidArguments",
            OutputErrorCode::ApplyError => "ApplyError",
            OutputErrorCode::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Errors produced while discovering, rewriting or writing back source files.
#[derive(Debug, Error)]
pub enum FixError {
    /// Reading or writing a file failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file-name glob could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A rule matcher could not be compiled.
    #[error("invalid rule {rule}: {reason}")]
    InvalidRule { rule: String, reason: String },

    /// The computed edit plan could not be applied to the text.
    #[error("patch error: {0}")]
    Patch(#[from] PatchError),

    /// The file changed on disk between read and write-back.
    #[error("file changed on disk since it was read: {}", path.display())]
    ConcurrentModification { path: PathBuf },
}

/// Result type for engine operations.
pub type FixResult<T> = Result<T, FixError>;

impl FixError {
    /// Wrap an IO error with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        FixError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

impl From<&FixError> for OutputErrorCode {
    fn from(err: &FixError) -> Self {
        match err {
            FixError::InvalidPattern { .. } => OutputErrorCode::InvalidArguments,
            FixError::InvalidRule { .. } => OutputErrorCode::InvalidArguments,
            FixError::Io { .. } => OutputErrorCode::ApplyError,
            FixError::ConcurrentModification { .. } => OutputErrorCode::ApplyError,
            FixError::Patch(_) => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
