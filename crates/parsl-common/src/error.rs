//! Fatal error conditions shared across the parsing core.
//!
//! Recoverable parse errors (malformed markup) are *not* represented here —
//! they are diagnostics collected as [`ParseIssue`]s, never a `Result`. This
//! module covers only conditions that are true internal inconsistencies: bugs,
//! not input the parser failed to make sense of.

use std::fmt;

/// A non-fatal diagnostic raised while tokenizing or constructing the tree.
///
/// Carries the source line and a named error kind matching the living
/// standard's error catalog (e.g. `missing-doctype-name`,
/// `incorrectly-closed-comment`). Collected by the dispatcher rather than
/// printed unconditionally, so a consumer can decide whether to surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// 1-based source line on which the issue was detected.
    pub line: usize,
    /// Named error kind, matching the living-standard catalog where one exists.
    pub kind: String,
    /// Human-readable detail.
    pub message: String,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.line, self.message, self.kind)
    }
}

/// Fatal conditions that indicate a bug in the parser itself rather than
/// malformed input. These must never fire on any input; if one does, it is
/// reported and the process aborts rather than silently producing a
/// corrupted tree.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The open-elements stack was popped while empty.
    #[error("open-elements stack exhausted while popping for tag id {tag_id}")]
    OpenElementsExhausted {
        /// Tag id of the element that was expected but never found.
        tag_id: u16,
    },

    /// `clear_to_context` ran past the bottom of the stack without finding an
    /// allowed context element.
    #[error("clear_to_context exhausted the stack without reaching an allowed context")]
    ContextExhausted,

    /// A state-machine invariant was violated (e.g. a helper was called with
    /// no current token when one was assumed to exist).
    #[error("internal invariant violated: {0}")]
    InvariantViolated(&'static str),
}
