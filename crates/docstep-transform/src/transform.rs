//! Accumulating steps against a document.

use docstep_model::{Attrs, Mark, Node, NodeType, Slice};
use tracing::trace;

use crate::error::StepResult;
use crate::map::Mapping;
use crate::step::Step;

/// A document together with the steps applied to it so far.
///
/// `docs[i]` is the document before `steps[i]`; `doc()` is the document
/// after the last step.
#[derive(Clone, Debug)]
pub struct Transform {
    docs: Vec<Node>,
    steps: Vec<Step>,
    mapping: Mapping,
    doc: Node,
}

impl Transform {
    pub fn new(doc: Node) -> Self {
        Self {
            docs: Vec::new(),
            steps: Vec::new(),
            mapping: Mapping::new(),
            doc,
        }
    }

    /// The current document.
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// The document before any step was applied.
    pub fn before(&self) -> &Node {
        self.docs.first().unwrap_or(&self.doc)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn docs(&self) -> &[Node] {
        &self.docs
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    /// Apply a step. On failure the transform is left unchanged.
    pub fn step(&mut self, step: Step) -> StepResult<&mut Self> {
        let next = step.apply(&self.doc)?;
        trace!(step = %step, size = next.content().size(), "applied step");
        self.mapping.append_map(step.get_map());
        self.docs.push(std::mem::replace(&mut self.doc, next));
        self.steps.push(step);
        Ok(self)
    }

    pub fn replace(&mut self, from: usize, to: usize, slice: Slice) -> StepResult<&mut Self> {
        self.step(Step::Replace { from, to, slice })
    }

    pub fn delete(&mut self, from: usize, to: usize) -> StepResult<&mut Self> {
        self.replace(from, to, Slice::empty())
    }

    /// Insert text with the given marks. Empty text is a no-op.
    pub fn insert_text(&mut self, pos: usize, text: &str, marks: Vec<Mark>) -> StepResult<&mut Self> {
        if text.is_empty() {
            return Ok(self);
        }
        let schema = self.doc.node_type().schema().clone();
        let node = schema.text(text, marks)?;
        self.replace(pos, pos, Slice::from_nodes(vec![node]))
    }

    pub fn add_mark(&mut self, from: usize, to: usize, mark: Mark) -> StepResult<&mut Self> {
        self.step(Step::AddMark { from, to, mark })
    }

    pub fn remove_mark(&mut self, from: usize, to: usize, mark: Mark) -> StepResult<&mut Self> {
        self.step(Step::RemoveMark { from, to, mark })
    }

    pub fn set_node_markup(
        &mut self,
        pos: usize,
        node_type: Option<NodeType>,
        attrs: Attrs,
        marks: Vec<Mark>,
    ) -> StepResult<&mut Self> {
        self.step(Step::SetNodeMarkup {
            pos,
            node_type,
            attrs,
            marks,
        })
    }
}
