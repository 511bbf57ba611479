//! Common utilities shared by the tokenizer and tree-construction crates.
//!
//! - **Warning system** - deduplicating, colored terminal output for
//!   recoverable parse errors and other unsupported-feature diagnostics.
//! - **Error types** - fatal, bug-indicating conditions that are never
//!   expected to fire on any input (see [`error::CoreError`]).

/// Fatal, bug-indicating error types and recoverable parse-issue records.
pub mod error;
/// Deduplicating diagnostic warnings for recoverable parse errors.
pub mod warning;
