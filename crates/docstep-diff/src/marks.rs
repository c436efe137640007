//! Reconciling inline marks once the unmarked documents agree.

use docstep_model::{Mark, Node};
use docstep_transform::{Step, Transform};
use tracing::debug;

use crate::error::RecreateResult;

/// An inline node's position range and its marks.
#[derive(Clone, Debug, PartialEq)]
struct InlineRange {
    from: usize,
    to: usize,
    marks: Vec<Mark>,
}

fn inline_ranges(doc: &Node) -> Vec<InlineRange> {
    let mut ranges = Vec::new();
    doc.descendants(&mut |node, pos, _| {
        if node.is_inline() {
            ranges.push(InlineRange {
                from: pos,
                to: pos + node.node_size(),
                marks: node.marks().to_vec(),
            });
            return false;
        }
        true
    });
    ranges
}

/// Pending mark steps in emission order. A range that continues the
/// latest step touching the same mark type, with the same kind and mark,
/// extends that step instead.
#[derive(Default)]
struct MarkSteps(Vec<Step>);

impl MarkSteps {
    fn push(&mut self, remove: bool, from: usize, to: usize, mark: &Mark) {
        let latest = self.0.iter_mut().rev().find(|step| match step {
            Step::AddMark { mark: m, .. } | Step::RemoveMark { mark: m, .. } => {
                m.mark_type() == mark.mark_type()
            }
            _ => false,
        });
        match latest {
            Some(Step::RemoveMark { to: end, mark: m, .. }) if remove && *end == from && m == mark => {
                *end = to;
            }
            Some(Step::AddMark { to: end, mark: m, .. }) if !remove && *end == from && m == mark => {
                *end = to;
            }
            _ => {
                let mark = mark.clone();
                self.0.push(if remove {
                    Step::RemoveMark { from, to, mark }
                } else {
                    Step::AddMark { from, to, mark }
                });
            }
        }
    }
}

/// Emits remove-mark and add-mark steps so the current document's inline
/// marks match the target's. Both documents must have the same structure
/// and text.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkReconciler;

impl MarkReconciler {
    pub fn reconcile(&self, tr: &mut Transform, target: &Node) -> RecreateResult<()> {
        let current = inline_ranges(tr.doc());
        let wanted = inline_ranges(target);

        let mut steps = MarkSteps::default();
        let (mut i, mut j) = (0, 0);
        while i < current.len() && j < wanted.len() {
            let (a, b) = (&current[i], &wanted[j]);
            let from = a.from.max(b.from);
            let to = a.to.min(b.to);
            if from < to {
                for mark in a.marks.iter().filter(|m| !m.is_in_set(&b.marks)) {
                    steps.push(true, from, to, mark);
                }
                for mark in b.marks.iter().filter(|m| !m.is_in_set(&a.marks)) {
                    steps.push(false, from, to, mark);
                }
            }
            if a.to <= b.to {
                i += 1;
            }
            if b.to <= a.to {
                j += 1;
            }
        }

        debug!(steps = steps.0.len(), "reconciled marks");
        for step in steps.0 {
            tr.step(step)?;
        }
        Ok(())
    }
}
