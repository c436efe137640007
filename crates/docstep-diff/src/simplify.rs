//! Post-processing that merges consecutive steps.

use docstep_transform::{Step, Transform};
use tracing::debug;

use crate::boundary::BoundaryResolver;
use crate::error::{RecreateError, RecreateResult};
use crate::locate::{DivergenceLocator, TreeContentDiff};
use crate::traits::Simplifier;

/// Replays a transform, merging each step into its predecessor where
/// [`Step::merge`] allows it.
///
/// A merged pair of replace steps is rebuilt as the single replace step
/// between the documents before and after the pair, and dropped when the
/// pair cancels out.
#[derive(Clone, Copy, Debug, Default)]
pub struct MergeSimplifier;

impl Simplifier for MergeSimplifier {
    fn simplify(&self, tr: Transform) -> RecreateResult<Transform> {
        let locator = DivergenceLocator::new(&TreeContentDiff);
        let mut out = Transform::new(tr.before().clone());
        let mut pending: Option<Step> = None;

        for step in tr.steps() {
            let Some(prev) = pending.take() else {
                pending = Some(step.clone());
                continue;
            };
            match prev.merge(step) {
                Some(Step::Replace { .. }) => {
                    let after = step.apply(&prev.apply(out.doc())?)?;
                    pending = BoundaryResolver.replace_step(&locator, out.doc(), &after)?;
                }
                Some(merged) => pending = Some(merged),
                None => {
                    out.step(prev)?;
                    pending = Some(step.clone());
                }
            }
        }
        if let Some(step) = pending {
            out.step(step)?;
        }

        if out.doc() != tr.doc() {
            return Err(RecreateError::invariant(
                "simplified steps do not reproduce the document",
            ));
        }
        debug!(
            before = tr.steps().len(),
            after = out.steps().len(),
            "simplified transform"
        );
        Ok(out)
    }
}
