//! Error types for the document model.

use thiserror::Error;

/// Errors produced by document model operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A position does not fall inside the node it was resolved against.
    #[error("position {pos} out of range (content size {size})")]
    PositionOutOfRange { pos: usize, size: usize },

    /// A node type name is not declared in the schema.
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    /// A mark type name is not declared in the schema.
    #[error("unknown mark type: {0}")]
    UnknownMarkType(String),

    /// A node's children (or marks) are not allowed by its type.
    #[error("invalid content for {node_type}: {reason}")]
    InvalidContent { node_type: String, reason: String },

    /// A replace could not be performed on the given range and slice.
    #[error("replace error: {0}")]
    Replace(String),

    /// Malformed JSON document or schema.
    #[error("invalid json: {0}")]
    Json(String),
}

impl ModelError {
    /// Create an invalid-content error for a node type.
    pub fn invalid_content(node_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidContent {
            node_type: node_type.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;
