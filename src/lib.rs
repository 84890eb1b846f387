//! returnfix: insert missing `return` before exit-triggering calls.
//!
//! Scans Express controllers (`src/modules/**/*.controller.ts`) and rewrites
//! `next(error);` and `res.json(...)` / `res.status(...).json(...)` statements
//! into `return ...` so handler code stops after responding.

// Engine - re-exported from returnfix-core
pub use returnfix_core::config;
pub use returnfix_core::diff;
pub use returnfix_core::discovery;
pub use returnfix_core::engine;
pub use returnfix_core::error;
pub use returnfix_core::guard;
pub use returnfix_core::mask;
pub use returnfix_core::matcher;
pub use returnfix_core::output;
pub use returnfix_core::patch;
pub use returnfix_core::rewrite;
pub use returnfix_core::rules;
pub use returnfix_core::source;
pub use returnfix_core::text;
pub use returnfix_core::writeback;

// Front door
pub mod cli;
