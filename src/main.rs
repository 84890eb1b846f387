//! Binary entry point for the returnfix CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Fix every controller under src/modules
//! returnfix
//!
//! # Preview changes as a unified diff without writing
//! returnfix --dry-run --format diff
//!
//! # Scan another tree, only the emit-json rule
//! returnfix --root app/routes --pattern '*.route.ts' --rule emit-json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use returnfix::cli::{execute_fix, CliError, OutputFormat};
use returnfix::config::{FixConfig, DEFAULT_ROOT};
use returnfix::output::emit_response;
use returnfix::rules::RuleKind;

// ============================================================================
// CLI Structure
// ============================================================================

/// Insert missing `return` before res.json(...) and next(error) calls.
#[derive(Parser, Debug)]
#[command(
    name = "returnfix",
    version,
    about = "Insert missing `return` before res.json(...) and next(error) calls"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Directory to scan.
    #[arg(long, default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// File-name glob to process (repeatable; default: *.controller.ts).
    #[arg(long = "pattern")]
    patterns: Vec<String>,

    /// Restrict to one rule (repeatable; default: all rules).
    #[arg(long = "rule")]
    rules: Vec<RuleKind>,

    /// Compute fixes without writing files.
    #[arg(long)]
    dry_run: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Global arguments.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (RUST_LOG overrides).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl Cli {
    fn to_config(&self) -> FixConfig {
        FixConfig::default()
            .with_root(&self.root)
            .with_patterns(self.patterns.iter().cloned())
            .with_rules(&self.rules)
            .with_dry_run(self.dry_run)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    let format = cli.format;
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = err.error_code();
            if format == OutputFormat::Json {
                let _ = emit_response(&err.to_response(), &mut io::stdout());
                let _ = io::stdout().flush();
            } else {
                eprintln!("error: {}", err);
            }
            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute one pass, writing the report to stdout.
fn execute(cli: Cli) -> Result<(), CliError> {
    let config = cli.to_config();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_fix(config, cli.format, &mut out)?;
    Ok(())
}
