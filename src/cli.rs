//! CLI front door.
//!
//! [`execute_fix`] runs one pass with a [`FixConfig`] and renders the result
//! to a writer in the requested [`OutputFormat`]. The binary in `main.rs`
//! only parses arguments, installs logging and maps errors to exit codes.
//!
//! ## Output formats
//!
//! - `text`: `Fixed: <path>` per file as it is fixed, then a blank line and
//!   `Fixed <N> files`
//! - `json`: one response object with `status` first
//! - `diff`: unified diff of the changed lines

use std::io::{self, Write};

use clap::ValueEnum;
use thiserror::Error;
use tracing::debug;

use returnfix_core::config::FixConfig;
use returnfix_core::diff::generate_unified_diff;
use returnfix_core::engine::Engine;
use returnfix_core::error::{FixError, OutputErrorCode};
use returnfix_core::output::{
    emit_response, render_fixed_line, render_summary, ErrorResponse, FixReport, FixResponse,
};

/// How the report is written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `Fixed: <path>` lines and a count (default).
    #[default]
    Text,
    /// Full JSON response.
    Json,
    /// Unified diff of changed lines.
    Diff,
}

/// Errors surfaced by the front door.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Fix(#[from] FixError),

    /// Writing the report failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    pub fn error_code(&self) -> OutputErrorCode {
        match self {
            CliError::Fix(err) => err.error_code(),
            CliError::Output(_) => OutputErrorCode::InternalError,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code().code(), self.to_string())
    }
}

/// Run one pass and render the report to `out`.
pub fn execute_fix(
    config: FixConfig,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<FixReport, CliError> {
    debug!(?config, ?format, "starting pass");
    let dry_run = config.dry_run;
    let engine = Engine::new(config)?;

    match format {
        OutputFormat::Text => {
            let mut write_err = None;
            let report = engine.run_with(|fixed| {
                if write_err.is_none() {
                    if let Err(e) = render_fixed_line(fixed, dry_run, out) {
                        write_err = Some(e);
                    }
                }
            })?;
            if let Some(e) = write_err {
                return Err(e.into());
            }
            render_summary(&report, out)?;
            out.flush()?;
            Ok(report)
        }
        OutputFormat::Json => {
            let report = engine.run()?;
            emit_response(&FixResponse::new(&report), out)?;
            out.flush()?;
            Ok(report)
        }
        OutputFormat::Diff => {
            let report = engine.run()?;
            write!(out, "{}", generate_unified_diff(&report.edits()))?;
            out.flush()?;
            Ok(report)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
