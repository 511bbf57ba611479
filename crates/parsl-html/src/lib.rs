//! Streaming HTML tokenizer and tree-construction core.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, script-data, and plaintext content models
//!   - DOCTYPE, comment, and markup-declaration-open handling
//!   - Attribute parsing
//!   - A tokenizer-state override channel driven by the dispatcher (e.g. `<title>` switching to RCDATA)
//!
//! - **Dispatcher / tree construction** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All insertion modes, including the table and select families
//!   - Stack of open elements, scope algorithms, implied end tags
//!   - Active formatting elements (reconstruction; adoption agency is a minimal stub)
//!   - `begin`/`end` callback emission per constructed node
//!
//! # Non-goals
//!
//! - Character reference expansion beyond a stub (named/numeric references pass through)
//! - Script execution
//! - The full adoption agency algorithm
//! - Full foreign-content integration beyond attribute adjustment
//! - Template contents as a separate document fragment
//! - DOM construction as an end in itself, layout, networking, encoding detection

/// Global-attribute name lookup table.
pub mod attrs;
/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;
/// Tag name/flags metadata table.
pub mod tags;

pub use parser::{HTMLParser, InsertionMode, ParseIssue, print_tree};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};
