//! Report types and their text/JSON renderings.
//!
//! Every JSON response has `status` as its first field and carries
//! [`SCHEMA_VERSION`]. Text output is the plain `Fixed: <path>` listing.

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::diff::OutputEdit;
use crate::error::FixError;
use crate::source::InsertionRecord;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// A file that was (or, in a dry run, would be) fixed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedFile {
    pub path: PathBuf,
    pub insertions: Vec<InsertionRecord>,
    /// Changed lines, for diff output.
    #[serde(skip)]
    pub edits: Vec<OutputEdit>,
}

/// Aggregate result of one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FixReport {
    pub files_scanned: usize,
    pub fixed: Vec<FixedFile>,
    pub dry_run: bool,
}

impl FixReport {
    pub fn fixed_count(&self) -> usize {
        self.fixed.len()
    }

    /// All line edits across fixed files, in report order.
    pub fn edits(&self) -> Vec<OutputEdit> {
        self.fixed
            .iter()
            .flat_map(|f| f.edits.iter().cloned())
            .collect()
    }
}

/// Successful run, as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct FixResponse<'a> {
    /// Status: "ok".
    pub status: &'static str,
    pub schema_version: &'static str,
    pub dry_run: bool,
    pub files_scanned: usize,
    pub fixed_count: usize,
    pub files: &'a [FixedFile],
}

impl<'a> FixResponse<'a> {
    pub fn new(report: &'a FixReport) -> Self {
        FixResponse {
            status: "ok",
            schema_version: SCHEMA_VERSION,
            dry_run: report.dry_run,
            files_scanned: report.files_scanned,
            fixed_count: report.fixed_count(),
            files: &report.fixed,
        }
    }
}

/// Error information.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric code, also the process exit status.
    pub code: u8,
    pub message: String,
}

/// Failed run, as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response with just code and message.
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code,
                message: message.into(),
            },
        }
    }

    pub fn from_error(err: &FixError) -> Self {
        ErrorResponse::new(err.error_code().code(), err.to_string())
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Write one `Fixed: <path>` line (`Would fix: <path>` in a dry run).
pub fn render_fixed_line(
    file: &FixedFile,
    dry_run: bool,
    writer: &mut impl Write,
) -> io::Result<()> {
    let verb = if dry_run { "Would fix" } else { "Fixed" };
    writeln!(writer, "{}: {}", verb, file.path.display())
}

/// Write the closing summary: a blank line, then `Fixed <N> files`.
pub fn render_summary(report: &FixReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    if report.dry_run {
        writeln!(writer, "Would fix {} files", report.fixed_count())
    } else {
        writeln!(writer, "Fixed {} files", report.fixed_count())
    }
}

/// Full text report.
pub fn render_text(report: &FixReport, writer: &mut impl Write) -> io::Result<()> {
    for file in &report.fixed {
        render_fixed_line(file, report.dry_run, writer)?;
    }
    render_summary(report, writer)
}

// ============================================================================
// Tests
// ============================================================================
