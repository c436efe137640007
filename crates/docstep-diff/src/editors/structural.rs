//! Replace steps for structural divergences.

use docstep_model::Node;
use docstep_transform::Transform;
use tracing::debug;

use crate::boundary::BoundaryResolver;
use crate::error::{RecreateError, RecreateResult};
use crate::locate::DivergenceLocator;

/// Replaces the diverging range of the full (annotated) documents in one step.
pub struct StructuralEditor<'a> {
    locator: &'a DivergenceLocator<'a>,
    resolver: BoundaryResolver,
}

impl<'a> StructuralEditor<'a> {
    pub fn new(locator: &'a DivergenceLocator<'a>) -> Self {
        Self {
            locator,
            resolver: BoundaryResolver,
        }
    }

    pub fn apply(&self, tr: &mut Transform, target: &Node) -> RecreateResult<()> {
        let step = self
            .resolver
            .replace_step(self.locator, tr.doc(), target)?
            .ok_or_else(|| {
                RecreateError::invariant("structural divergence but the documents are equal")
            })?;
        debug!(step = %step, "structural edit");
        tr.step(step)?;
        Ok(())
    }
}
