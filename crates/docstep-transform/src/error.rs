//! Error types for the step engine.

use docstep_model::ModelError;

/// Errors that can occur while applying or decoding steps.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    /// The underlying model rejected the change.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// The step's range does not fit the document.
    #[error("range {from}..{to} out of bounds for document of size {size}")]
    OutOfRange { from: usize, to: usize, size: usize },

    /// No node starts at the given position.
    #[error("no node at position {0}")]
    NoNodeAt(usize),

    /// A markup change targeted a text node.
    #[error("cannot change the markup of the text node at {0}")]
    TextNode(usize),

    /// Marks were requested on a node type that cannot carry them.
    #[error("node type {0} cannot carry marks")]
    MarksNotAllowed(String),
}

/// Convenience alias for step results.
pub type StepResult<T> = Result<T, StepError>;
