//! Capabilities the reconstruction core depends on.
//!
//! Each has a default implementation in this crate; tests and embedders
//! can swap in their own through [`crate::Recreator`].

use docstep_model::{DiffEnd, Node};
use docstep_transform::Transform;

use crate::error::RecreateResult;
use crate::text_diff::{Granularity, TextSegment};

/// Locates where the content of two documents starts and stops differing.
pub trait ContentDiff: Send + Sync {
    /// First position at which the documents' content differs, `None` when equal.
    fn diff_start(&self, a: &Node, b: &Node) -> Option<usize>;

    /// Positions in `a` and `b` after which their content is equal again.
    fn diff_end(&self, a: &Node, b: &Node) -> Option<DiffEnd>;
}

/// Splits two strings into unchanged, added and removed segments.
pub trait TextDiffer: Send + Sync {
    /// Concatenating unchanged and removed segments must give `old`;
    /// unchanged and added segments must give `new`.
    fn diff(&self, old: &str, new: &str, granularity: Granularity) -> Vec<TextSegment>;
}

/// Rewrites a finished transform into an equivalent one with fewer steps.
pub trait Simplifier: Send + Sync {
    /// The returned transform must start from `tr.before()` and end at `tr.doc()`.
    fn simplify(&self, tr: Transform) -> RecreateResult<Transform>;
}
