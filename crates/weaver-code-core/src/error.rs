//! Error types for document transforms and history management.

/// Errors raised by `TextDocument` transforms.
///
/// These are programmer errors (a processor calling a selection-dependent
/// transform on a document without a selection) and are never recovered from
/// internally.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The operation needs a caret or range but the document has no selection.
    #[error("invalid selection: `{operation}` requires an active selection")]
    InvalidSelection { operation: &'static str },

    /// The operation needs a collapsed caret.
    #[error("invalid selection: `{operation}` requires a caret, not a range")]
    NotACaret { operation: &'static str },

    /// A user-supplied pattern failed to compile.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A host-supplied processor failed.
    #[error("input processor failed: {0}")]
    Processor(String),
}

impl DocumentError {
    pub(crate) fn no_selection(operation: &'static str) -> Self {
        Self::InvalidSelection { operation }
    }
}

/// Errors raised by the undo/redo manager.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// An operation was invoked before a client was attached.
    #[error("undo/redo manager has no client attached")]
    NoClient,
}
