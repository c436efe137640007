//! JSON representation of steps.

use docstep_model::{Attrs, Mark, MarkJson, Schema, SliceJson};
use serde::{Deserialize, Serialize};

use crate::error::StepResult;
use crate::step::Step;

/// Serialized step, tagged by `stepType`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stepType", rename_all = "camelCase")]
pub enum StepJson {
    Replace {
        from: usize,
        to: usize,
        #[serde(default)]
        slice: SliceJson,
    },
    #[serde(rename_all = "camelCase")]
    SetNodeMarkup {
        pos: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_type: Option<String>,
        #[serde(default)]
        attrs: Attrs,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<MarkJson>,
    },
    AddMark {
        from: usize,
        to: usize,
        mark: MarkJson,
    },
    RemoveMark {
        from: usize,
        to: usize,
        mark: MarkJson,
    },
}

impl Step {
    pub fn to_json(&self) -> StepJson {
        match self {
            Step::Replace { from, to, slice } => StepJson::Replace {
                from: *from,
                to: *to,
                slice: slice.to_json(),
            },
            Step::SetNodeMarkup {
                pos,
                node_type,
                attrs,
                marks,
            } => StepJson::SetNodeMarkup {
                pos: *pos,
                node_type: node_type.as_ref().map(|t| t.name().to_string()),
                attrs: attrs.clone(),
                marks: marks.iter().map(Mark::to_json).collect(),
            },
            Step::AddMark { from, to, mark } => StepJson::AddMark {
                from: *from,
                to: *to,
                mark: mark.to_json(),
            },
            Step::RemoveMark { from, to, mark } => StepJson::RemoveMark {
                from: *from,
                to: *to,
                mark: mark.to_json(),
            },
        }
    }

    /// Decode a step, resolving type names against `schema`.
    pub fn from_json(schema: &Schema, json: &StepJson) -> StepResult<Step> {
        let step = match json {
            StepJson::Replace { from, to, slice } => Step::Replace {
                from: *from,
                to: *to,
                slice: schema.slice_from_json(slice)?,
            },
            StepJson::SetNodeMarkup {
                pos,
                node_type,
                attrs,
                marks,
            } => Step::SetNodeMarkup {
                pos: *pos,
                node_type: node_type
                    .as_deref()
                    .map(|name| schema.node_type(name))
                    .transpose()?,
                attrs: attrs.clone(),
                marks: marks
                    .iter()
                    .map(|m| schema.mark_from_json(m))
                    .collect::<Result<_, _>>()?,
            },
            StepJson::AddMark { from, to, mark } => Step::AddMark {
                from: *from,
                to: *to,
                mark: schema.mark_from_json(mark)?,
            },
            StepJson::RemoveMark { from, to, mark } => Step::RemoveMark {
                from: *from,
                to: *to,
                mark: schema.mark_from_json(mark)?,
            },
        };
        Ok(step)
    }
}
