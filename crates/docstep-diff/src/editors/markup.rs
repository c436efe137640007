//! In-place node markup changes.

use docstep_model::Node;
use docstep_transform::{Step, Transform};
use tracing::debug;

use crate::error::{RecreateError, RecreateResult};
use crate::locate::DiffWindow;

/// Emits one set-node-markup step at the start of a markup divergence.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkupEditor;

impl MarkupEditor {
    /// The new type is only set when it differs; attributes and marks are
    /// copied from the node in the (annotated) target.
    pub fn apply(&self, tr: &mut Transform, target: &Node, window: DiffWindow) -> RecreateResult<()> {
        let pos = window.start;
        let current = tr.doc().node_at(pos).ok_or_else(|| {
            RecreateError::invariant(format!("markup divergence without a current node at {pos}"))
        })?;
        let wanted = target.node_at(pos).ok_or_else(|| {
            RecreateError::invariant(format!("markup divergence without a target node at {pos}"))
        })?;

        let node_type = (current.node_type() != wanted.node_type()).then(|| wanted.node_type().clone());
        debug!(
            pos,
            from = %current.node_type(),
            to = %wanted.node_type(),
            "markup edit"
        );
        tr.step(Step::SetNodeMarkup {
            pos,
            node_type,
            attrs: wanted.attrs().clone(),
            marks: wanted.marks().to_vec(),
        })?;
        Ok(())
    }
}
