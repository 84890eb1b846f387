//! Core engine for returnfix.
//!
//! This crate finds exit-triggering calls in request-handler sources and
//! inserts the missing `return` before them:
//! - Masking of comments and string literals
//! - Pattern rules and statement-position matching
//! - Idempotence guard
//! - Insertion-based rewriting
//! - File discovery and atomic write-back
//! - Error types, JSON output types and diff generation

pub mod config;
pub mod diff;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod guard;
pub mod mask;
pub mod matcher;
pub mod output;
pub mod patch;
pub mod rewrite;
pub mod rules;
pub mod source;
pub mod text;
pub mod writeback;
