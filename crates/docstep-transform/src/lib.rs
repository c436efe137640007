//! Step engine for docstep.
//!
//! Documents change through a sequence of atomic steps. Each step can be
//! applied, inverted, serialized and merged with its successor, and
//! reports how it moves positions.
//!
//! # Key Types
//!
//! - [`Step`] -- Replace, set-node-markup, add-mark and remove-mark edits
//! - [`StepMap`] / [`Mapping`] -- Position mapping through steps
//! - [`Transform`] -- A document plus the steps applied to it
//! - [`StepJson`] -- JSON form of a step

pub mod error;
pub mod json;
pub mod map;
pub mod step;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use error::{StepError, StepResult};
pub use json::StepJson;
pub use map::{Assoc, MapResult, Mapping, StepMap};
pub use step::Step;
pub use transform::Transform;
