//! Step reconstruction for docstep.
//!
//! Given two snapshots of a document, recreate a sequence of steps that
//! turns the first into the second. Detailed mode produces small,
//! meaningful edits (text changes inside a run, node type changes, mark
//! changes); simple mode produces one replace step per divergence.
//!
//! # Key Types
//!
//! - [`Recreator`] -- Reconstruction driver with injectable capabilities
//! - [`RecreateOptions`] -- Detailed/simple mode, text granularity, simplification
//! - [`DivergenceLocator`] / [`DiffWindow`] -- Where two documents diverge
//! - [`BoundaryResolver`] -- Replace boundaries for ambiguous windows
//! - [`DiffClassifier`] / [`Divergence`] -- Text, markup or structural change
//! - [`MarkReconciler`] -- Mark steps once text and structure agree
//! - [`MergeSimplifier`] -- Merges consecutive steps
//! - [`ContentDiff`] / [`TextDiffer`] / [`Simplifier`] -- Capability traits

pub mod boundary;
pub mod classify;
pub mod config;
pub mod editors;
pub mod error;
pub mod locate;
pub mod marks;
pub mod recreate;
pub mod simplify;
pub mod text_diff;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use boundary::BoundaryResolver;
pub use classify::{DiffClassifier, Divergence, TextDivergence};
pub use config::RecreateOptions;
pub use editors::{MarkupEditor, StructuralEditor, TextRunEditor};
pub use error::{RecreateError, RecreateMode, RecreateResult};
pub use locate::{DiffWindow, DivergenceLocator, TreeContentDiff};
pub use marks::MarkReconciler;
pub use recreate::{recreate_transform, Recreator, MAX_ITERATIONS, MAX_TOTAL_ITERATIONS};
pub use simplify::MergeSimplifier;
pub use text_diff::{Granularity, SegmentTag, SimilarTextDiff, TextSegment};
pub use traits::{ContentDiff, Simplifier, TextDiffer};
