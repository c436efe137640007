//! Schemas: the node and mark types a document may be built from.
//!
//! A [`Schema`] is a cheap-clone handle. [`NodeType`] and [`MarkType`] are
//! indexes into the schema that produced them, so two types are only equal
//! when they come from the same schema instance.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ModelError, ModelResult};
use crate::fragment::Fragment;
use crate::mark::Mark;
use crate::node::{Attrs, Node};

/// Name of the node type used for text leaves. Always present in a schema.
pub const TEXT_NODE: &str = "text";

/// Whether a node type lives among blocks or inside textblocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeGroup {
    Block,
    Inline,
}

/// What kind of children a node type accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A leaf: no children at all.
    #[default]
    Empty,
    /// Text and inline leaves (a textblock).
    Inline,
    /// Block nodes.
    Block,
}

impl ContentKind {
    fn accepts(self, group: NodeGroup) -> bool {
        matches!(
            (self, group),
            (ContentKind::Inline, NodeGroup::Inline) | (ContentKind::Block, NodeGroup::Block)
        )
    }
}

// ---------------------------------------------------------------------------
// Specs (serializable)
// ---------------------------------------------------------------------------

/// Declaration of a node type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub group: NodeGroup,
    #[serde(default)]
    pub content: ContentKind,
    /// Default attribute values, merged under the attributes a node is created with.
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl NodeSpec {
    /// A block node type with the given content kind.
    pub fn block(name: impl Into<String>, content: ContentKind) -> Self {
        Self {
            name: name.into(),
            group: NodeGroup::Block,
            content,
            attrs: Attrs::new(),
        }
    }

    /// An inline leaf node type.
    pub fn inline(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: NodeGroup::Inline,
            content: ContentKind::Empty,
            attrs: Attrs::new(),
        }
    }

    /// Add a default attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }
}

/// Declaration of a mark type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl MarkSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }
}

/// Serializable description of a whole schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaSpec {
    /// Name of the node type used for document roots.
    pub top: String,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub marks: Vec<MarkSpec>,
}

impl SchemaSpec {
    /// A general-purpose rich text schema: paragraphs, headings, quotes,
    /// lists, code blocks, rules, images and line breaks, with emphasis,
    /// strong, code and link marks.
    pub fn basic() -> Self {
        Self {
            top: "doc".into(),
            nodes: vec![
                NodeSpec::block("doc", ContentKind::Block),
                NodeSpec::block("paragraph", ContentKind::Inline),
                NodeSpec::block("heading", ContentKind::Inline).with_attr("level", json!(1)),
                NodeSpec::block("blockquote", ContentKind::Block),
                NodeSpec::block("code_block", ContentKind::Inline)
                    .with_attr("language", Value::Null),
                NodeSpec::block("horizontal_rule", ContentKind::Empty),
                NodeSpec::block("bullet_list", ContentKind::Block),
                NodeSpec::block("ordered_list", ContentKind::Block).with_attr("order", json!(1)),
                NodeSpec::block("list_item", ContentKind::Block),
                NodeSpec::inline(TEXT_NODE),
                NodeSpec::inline("image")
                    .with_attr("src", json!(""))
                    .with_attr("alt", Value::Null)
                    .with_attr("title", Value::Null),
                NodeSpec::inline("hard_break"),
            ],
            marks: vec![
                MarkSpec::new("link")
                    .with_attr("href", json!(""))
                    .with_attr("title", Value::Null),
                MarkSpec::new("em"),
                MarkSpec::new("strong"),
                MarkSpec::new("code"),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

struct SchemaInner {
    nodes: Vec<NodeSpec>,
    marks: Vec<MarkSpec>,
    node_index: BTreeMap<String, usize>,
    mark_index: BTreeMap<String, usize>,
    top: usize,
    text: usize,
}

/// A compiled schema.
#[derive(Clone)]
pub struct Schema(Arc<SchemaInner>);

impl Schema {
    /// Compile a schema from its spec.
    ///
    /// A `text` node type is added when the spec does not declare one. The
    /// top node type must accept block content.
    pub fn new(spec: SchemaSpec) -> ModelResult<Self> {
        let mut nodes = spec.nodes;
        if !nodes.iter().any(|n| n.name == TEXT_NODE) {
            nodes.push(NodeSpec::inline(TEXT_NODE));
        }

        let mut node_index = BTreeMap::new();
        for (i, node) in nodes.iter().enumerate() {
            if node_index.insert(node.name.clone(), i).is_some() {
                return Err(ModelError::Json(format!("duplicate node type '{}'", node.name)));
            }
        }
        let mut mark_index = BTreeMap::new();
        for (i, mark) in spec.marks.iter().enumerate() {
            if mark_index.insert(mark.name.clone(), i).is_some() {
                return Err(ModelError::Json(format!("duplicate mark type '{}'", mark.name)));
            }
        }

        let text = node_index[TEXT_NODE];
        if nodes[text].group != NodeGroup::Inline || nodes[text].content != ContentKind::Empty {
            return Err(ModelError::invalid_content(
                TEXT_NODE,
                "the text node type must be an inline leaf",
            ));
        }
        let top = *node_index
            .get(&spec.top)
            .ok_or_else(|| ModelError::UnknownNodeType(spec.top.clone()))?;
        if nodes[top].content != ContentKind::Block {
            return Err(ModelError::invalid_content(
                spec.top,
                "the top node type must accept block content",
            ));
        }

        Ok(Self(Arc::new(SchemaInner {
            nodes,
            marks: spec.marks,
            node_index,
            mark_index,
            top,
            text,
        })))
    }

    /// The schema built from [`SchemaSpec::basic`].
    pub fn basic() -> Self {
        Self::new(SchemaSpec::basic()).expect("basic schema spec is valid")
    }

    /// The spec this schema was compiled from (including an implicit text type).
    pub fn spec(&self) -> SchemaSpec {
        SchemaSpec {
            top: self.0.nodes[self.0.top].name.clone(),
            nodes: self.0.nodes.clone(),
            marks: self.0.marks.clone(),
        }
    }

    /// Look up a node type by name.
    pub fn node_type(&self, name: &str) -> ModelResult<NodeType> {
        self.0
            .node_index
            .get(name)
            .map(|&index| NodeType {
                schema: self.clone(),
                index,
            })
            .ok_or_else(|| ModelError::UnknownNodeType(name.to_string()))
    }

    /// Look up a mark type by name.
    pub fn mark_type(&self, name: &str) -> ModelResult<MarkType> {
        self.0
            .mark_index
            .get(name)
            .map(|&index| MarkType {
                schema: self.clone(),
                index,
            })
            .ok_or_else(|| ModelError::UnknownMarkType(name.to_string()))
    }

    /// The node type of document roots.
    pub fn top_node_type(&self) -> NodeType {
        NodeType {
            schema: self.clone(),
            index: self.0.top,
        }
    }

    /// The node type of text leaves.
    pub fn text_type(&self) -> NodeType {
        NodeType {
            schema: self.clone(),
            index: self.0.text,
        }
    }

    /// Create a validated node of the named type.
    pub fn node(&self, name: &str, attrs: Attrs, content: Vec<Node>) -> ModelResult<Node> {
        self.node_type(name)?
            .create(attrs, Fragment::from_vec(content), Vec::new())
    }

    /// Create a text leaf. Empty text is rejected.
    pub fn text(&self, text: &str, marks: Vec<Mark>) -> ModelResult<Node> {
        if text.is_empty() {
            return Err(ModelError::invalid_content(TEXT_NODE, "empty text nodes are not allowed"));
        }
        Ok(Node::new_text(
            self.text_type(),
            text.to_string(),
            Mark::normalize_set(marks),
        ))
    }

    /// Create a mark of the named type.
    pub fn mark(&self, name: &str, attrs: Attrs) -> ModelResult<Mark> {
        Ok(self.mark_type(name)?.create(attrs))
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("top", &self.0.nodes[self.0.top].name)
            .field("nodes", &self.0.node_index.keys().collect::<Vec<_>>())
            .field("marks", &self.0.mark_index.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// NodeType
// ---------------------------------------------------------------------------

/// A node type of a particular schema.
#[derive(Clone)]
pub struct NodeType {
    schema: Schema,
    index: usize,
}

impl NodeType {
    fn spec(&self) -> &NodeSpec {
        &self.schema.0.nodes[self.index]
    }

    pub fn name(&self) -> &str {
        &self.spec().name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn group(&self) -> NodeGroup {
        self.spec().group
    }

    pub fn content_kind(&self) -> ContentKind {
        self.spec().content
    }

    pub fn is_text(&self) -> bool {
        self.index == self.schema.0.text
    }

    pub fn is_inline(&self) -> bool {
        self.group() == NodeGroup::Inline
    }

    pub fn is_block(&self) -> bool {
        self.group() == NodeGroup::Block
    }

    /// A block whose children are inline.
    pub fn is_textblock(&self) -> bool {
        self.is_block() && self.content_kind() == ContentKind::Inline
    }

    pub fn is_leaf(&self) -> bool {
        self.content_kind() == ContentKind::Empty
    }

    /// Whether content of `other` could be joined into a node of this type.
    pub fn compatible_content(&self, other: &NodeType) -> bool {
        self == other || self.content_kind() == other.content_kind()
    }

    /// Merge the given attributes over this type's defaults.
    pub fn compute_attrs(&self, attrs: Attrs) -> Attrs {
        let mut computed = self.spec().attrs.clone();
        computed.extend(attrs);
        computed
    }

    /// Check that `content` may appear as this type's children.
    pub fn check_content(&self, content: &Fragment) -> ModelResult<()> {
        let kind = self.content_kind();
        for child in content.iter() {
            if !kind.accepts(child.node_type().group()) {
                return Err(ModelError::invalid_content(
                    self.name(),
                    format!("{} is not allowed here", child.node_type().name()),
                ));
            }
            if !child.marks().is_empty() && !child.is_inline() {
                return Err(ModelError::invalid_content(
                    self.name(),
                    format!("{} is a block and cannot carry marks", child.node_type().name()),
                ));
            }
        }
        Ok(())
    }

    pub fn valid_content(&self, content: &Fragment) -> bool {
        self.check_content(content).is_ok()
    }

    /// Create a validated non-text node of this type.
    pub fn create(&self, attrs: Attrs, content: Fragment, marks: Vec<Mark>) -> ModelResult<Node> {
        if self.is_text() {
            return Err(ModelError::invalid_content(
                TEXT_NODE,
                "text nodes are created with Schema::text",
            ));
        }
        if !marks.is_empty() && !self.is_inline() {
            return Err(ModelError::invalid_content(
                self.name(),
                "only inline nodes can carry marks",
            ));
        }
        self.check_content(&content)?;
        Ok(Node::new(
            self.clone(),
            self.compute_attrs(attrs),
            content,
            Mark::normalize_set(marks),
        ))
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.schema == other.schema
    }
}

impl Eq for NodeType {}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeType({})", self.name())
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// MarkType
// ---------------------------------------------------------------------------

/// A mark type of a particular schema.
#[derive(Clone)]
pub struct MarkType {
    schema: Schema,
    index: usize,
}

impl MarkType {
    fn spec(&self) -> &MarkSpec {
        &self.schema.0.marks[self.index]
    }

    pub fn name(&self) -> &str {
        &self.spec().name
    }

    /// Position in the schema's declaration order; mark sets are sorted by it.
    pub fn rank(&self) -> usize {
        self.index
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn compute_attrs(&self, attrs: Attrs) -> Attrs {
        let mut computed = self.spec().attrs.clone();
        computed.extend(attrs);
        computed
    }

    pub fn create(&self, attrs: Attrs) -> Mark {
        Mark::new(self.clone(), self.compute_attrs(attrs))
    }
}

impl PartialEq for MarkType {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.schema == other.schema
    }
}

impl Eq for MarkType {}

impl fmt::Debug for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarkType({})", self.name())
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
