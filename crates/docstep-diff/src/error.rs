//! Error types for step reconstruction.

use std::fmt;

use docstep_model::ModelError;
use docstep_transform::StepError;

/// Which reconstruction loop was running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecreateMode {
    /// Classify each divergence and emit text, markup or structural edits.
    Detailed,
    /// Emit one replace step per divergence.
    Simple,
}

impl fmt::Display for RecreateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detailed => f.write_str("detailed"),
            Self::Simple => f.write_str("simple"),
        }
    }
}

/// Errors that can occur while recreating steps.
#[derive(Debug, thiserror::Error)]
pub enum RecreateError {
    /// A constructed step is invalid against the current document.
    #[error("step application failed: {0}")]
    StepApplication(#[from] StepError),

    /// The iteration cap was reached without the documents converging.
    #[error("{mode} reconstruction did not converge after {iterations} iterations")]
    NonConvergence {
        mode: RecreateMode,
        iterations: usize,
    },

    /// The document roots differ in type or attributes; no step can change them.
    #[error("document roots differ: {current} vs {target}")]
    IncompatibleRoots { current: String, target: String },

    /// Position resolution or slicing failed.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// An internal consistency check failed.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl RecreateError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }
}

/// Convenience alias for reconstruction results.
pub type RecreateResult<T> = Result<T, RecreateError>;
