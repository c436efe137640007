//! Locating the region where two documents diverge.

use docstep_model::{DiffEnd, Node};

use crate::error::{RecreateError, RecreateResult};
use crate::traits::ContentDiff;

/// Where two documents diverge.
///
/// `start` is the first differing position (shared by both documents);
/// `end_current` and `end_target` are where the equal trailing content
/// starts in each document. The trailing scan is independent of the
/// leading one, so `start` may lie past one of the ends when repeated
/// content straddles the divergence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffWindow {
    pub start: usize,
    pub end_current: usize,
    pub end_target: usize,
}

impl DiffWindow {
    /// How far `start` reaches past the nearer end; zero when unambiguous.
    pub fn overlap(&self) -> usize {
        self.start
            .saturating_sub(self.end_current.min(self.end_target))
    }
}

/// [`ContentDiff`] backed by the model's fragment comparison.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeContentDiff;

impl ContentDiff for TreeContentDiff {
    fn diff_start(&self, a: &Node, b: &Node) -> Option<usize> {
        a.content().find_diff_start(b.content(), 0)
    }

    fn diff_end(&self, a: &Node, b: &Node) -> Option<DiffEnd> {
        a.content()
            .find_diff_end(b.content(), a.content().size(), b.content().size())
    }
}

/// Finds the next divergence between the current document and the target.
pub struct DivergenceLocator<'a> {
    content: &'a dyn ContentDiff,
}

impl<'a> DivergenceLocator<'a> {
    pub fn new(content: &'a dyn ContentDiff) -> Self {
        Self { content }
    }

    /// `None` when the documents' content is equal.
    pub fn locate(&self, current: &Node, target: &Node) -> RecreateResult<Option<DiffWindow>> {
        let Some(start) = self.content.diff_start(current, target) else {
            return Ok(None);
        };
        let end = self.content.diff_end(current, target).ok_or_else(|| {
            RecreateError::invariant(format!(
                "content differs at {start} but no end of the divergence was found"
            ))
        })?;
        Ok(Some(DiffWindow {
            start,
            end_current: end.a,
            end_target: end.b,
        }))
    }
}
