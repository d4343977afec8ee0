//! Markdown construction errors.

/// Error returned when a node is constructed with invalid arguments.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MarkdownError {
    /// Header level outside `1..=6`.
    #[error("invalid header level {0}: expected 1 to 6")]
    InvalidHeaderLevel(u8),
}
