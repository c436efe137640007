//! Boundary placement for replace steps.
//!
//! When the leading and trailing scans of the locator overlap, the same
//! difference can be explained by moving the start back or the ends
//! forward. Both placements are scored and the better one is used to
//! build the replace step.

use docstep_model::{Node, ResolvedPos};
use docstep_transform::Step;
use tracing::debug;

use crate::error::RecreateResult;
use crate::locate::{DiffWindow, DivergenceLocator};

const DEPTH_PENALTY: i64 = 10;
const IDENTICAL_NODE_BONUS: i64 = 100;
const SAME_MARKUP_BONUS: i64 = 20;
const SAME_TYPE_BEFORE_BONUS: i64 = 10;

/// Chooses replace boundaries for a divergence window.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundaryResolver;

impl BoundaryResolver {
    /// Return a window with `start <= end_current` and `start <= end_target`.
    pub fn resolve(&self, current: &Node, target: &Node, window: DiffWindow) -> RecreateResult<DiffWindow> {
        let overlap = window.overlap();
        if overlap == 0 {
            return Ok(window);
        }

        let shifted = DiffWindow {
            start: window.start - overlap,
            ..window
        };
        let extended = DiffWindow {
            end_current: window.end_current + overlap,
            end_target: window.end_target + overlap,
            ..window
        };
        let shifted_score = self.score(current, target, shifted)?;
        let extended_score = self.score(current, target, extended)?;
        let chosen = if shifted_score > extended_score {
            shifted
        } else {
            extended
        };
        debug!(
            overlap,
            shifted_score,
            extended_score,
            start = chosen.start,
            end_current = chosen.end_current,
            end_target = chosen.end_target,
            "resolved ambiguous boundary"
        );
        Ok(chosen)
    }

    /// Higher is better. Depends only on the documents and the window.
    pub fn score(&self, current: &Node, target: &Node, window: DiffWindow) -> RecreateResult<i64> {
        let start_current = current.resolve(window.start)?;
        let start_target = target.resolve(window.start)?;
        let end_current = current.resolve(window.end_current)?;
        let end_target = target.resolve(window.end_target)?;

        let mut score = 0;
        for (a, b) in [(&start_current, &start_target), (&end_current, &end_target)] {
            score -= DEPTH_PENALTY * (a.depth() + b.depth()) as i64;
            score += boundary_bonus(a, b);
        }
        let size = (window.end_current - window.start) + (window.end_target - window.start);
        Ok(score - size as i64)
    }

    /// Build the replace step turning `current` into `target`, or `None`
    /// when the locator finds no divergence.
    pub fn replace_step(
        &self,
        locator: &DivergenceLocator<'_>,
        current: &Node,
        target: &Node,
    ) -> RecreateResult<Option<Step>> {
        let Some(window) = locator.locate(current, target)? else {
            return Ok(None);
        };
        let window = self.resolve(current, target, window)?;
        let slice = target.slice(window.start, window.end_target)?;
        Ok(Some(Step::Replace {
            from: window.start,
            to: window.end_current,
            slice,
        }))
    }
}

fn boundary_bonus(a: &ResolvedPos, b: &ResolvedPos) -> i64 {
    let mut bonus = 0;
    if let (Some(x), Some(y)) = (a.node_after(), b.node_after()) {
        if x == y {
            bonus += IDENTICAL_NODE_BONUS;
        } else if x.same_markup(&y) {
            bonus += SAME_MARKUP_BONUS;
        }
    }
    if let (Some(x), Some(y)) = (a.node_before(), b.node_before()) {
        if x.node_type() == y.node_type() {
            bonus += SAME_TYPE_BEFORE_BONUS;
        }
    }
    bonus
}
