//! Document model for docstep.
//!
//! Rich-text documents are persistent trees of typed nodes. Text leaves
//! carry sets of marks (emphasis, links, ...), and every location in a
//! document is addressed by an integer position.
//!
//! # Key Types
//!
//! - [`Schema`] / [`NodeType`] / [`MarkType`] -- Allowed node and mark types
//! - [`Node`] / [`Fragment`] -- Immutable trees and child lists
//! - [`Mark`] -- Inline annotation, kept in rank-sorted sets
//! - [`ResolvedPos`] -- A position with its ancestor path
//! - [`Slice`] -- A cut-out piece of a document, possibly open at its sides
//! - [`NodeJson`] / [`MarkJson`] / [`SliceJson`] -- JSON forms

pub mod error;
pub mod fragment;
pub mod json;
pub mod mark;
pub mod node;
mod replace;
pub mod resolve;
pub mod schema;
pub mod slice;

#[cfg(test)]
mod test_support;

pub use error::{ModelError, ModelResult};
pub use fragment::{DiffEnd, Fragment};
pub use json::{MarkJson, NodeJson, SliceJson};
pub use mark::Mark;
pub use node::{Attrs, Node};
pub use resolve::ResolvedPos;
pub use schema::{
    ContentKind, MarkSpec, MarkType, NodeGroup, NodeSpec, NodeType, Schema, SchemaSpec, TEXT_NODE,
};
pub use slice::Slice;
