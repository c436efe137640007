//! JSON representation of nodes, marks and slices.
//!
//! The shapes follow the common rich-text editor convention:
//! `{"type": "paragraph", "attrs": {...}, "content": [...]}` for nodes and
//! `{"type": "text", "text": "...", "marks": [...]}` for text.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::fragment::Fragment;
use crate::mark::Mark;
use crate::node::{Attrs, Node};
use crate::schema::{Schema, TEXT_NODE};
use crate::slice::Slice;

/// Serialized node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeJson {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<NodeJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<MarkJson>,
}

/// Serialized mark.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkJson {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

/// Serialized slice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceJson {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<NodeJson>,
    #[serde(default)]
    pub open_start: usize,
    #[serde(default)]
    pub open_end: usize,
}

impl Schema {
    /// Build and validate a node from its JSON form.
    pub fn node_from_json(&self, json: &NodeJson) -> ModelResult<Node> {
        let marks = json
            .marks
            .iter()
            .map(|m| self.mark_from_json(m))
            .collect::<ModelResult<Vec<_>>>()?;

        if json.node_type == TEXT_NODE {
            let text = json
                .text
                .as_deref()
                .ok_or_else(|| ModelError::Json("text node without text".into()))?;
            if !json.content.is_empty() {
                return Err(ModelError::Json("text node with content".into()));
            }
            return self.text(text, marks);
        }
        if json.text.is_some() {
            return Err(ModelError::Json(format!(
                "{} node cannot carry text",
                json.node_type
            )));
        }

        let node_type = self.node_type(&json.node_type)?;
        let children = json
            .content
            .iter()
            .map(|c| self.node_from_json(c))
            .collect::<ModelResult<Vec<_>>>()?;
        node_type.create(json.attrs.clone(), Fragment::from_vec(children), marks)
    }

    pub fn mark_from_json(&self, json: &MarkJson) -> ModelResult<Mark> {
        self.mark(&json.mark_type, json.attrs.clone())
    }

    pub fn slice_from_json(&self, json: &SliceJson) -> ModelResult<Slice> {
        let children = json
            .content
            .iter()
            .map(|c| self.node_from_json(c))
            .collect::<ModelResult<Vec<_>>>()?;
        let content = Fragment::from_vec(children);
        if json.open_start + json.open_end > content.size() {
            return Err(ModelError::Json(format!(
                "open depths {}/{} exceed slice content",
                json.open_start, json.open_end
            )));
        }
        Ok(Slice::new(content, json.open_start, json.open_end))
    }

    /// Parse a document from a JSON string. The root must be of the top node type.
    pub fn parse_doc(&self, input: &str) -> ModelResult<Node> {
        let json: NodeJson =
            serde_json::from_str(input).map_err(|e| ModelError::Json(e.to_string()))?;
        let doc = self.node_from_json(&json)?;
        if doc.node_type() != &self.top_node_type() {
            return Err(ModelError::Json(format!(
                "document root must be '{}', found '{}'",
                self.top_node_type().name(),
                doc.node_type().name()
            )));
        }
        Ok(doc)
    }
}
