//! HTML parser module for tree construction.

/// Foreign content (SVG, MathML) support.
pub mod foreign_content;

/// HTML parser implementation.
pub mod core;

pub use core::{print_tree, HTMLParser, InsertionMode};
pub use parsl_common::error::ParseIssue;
