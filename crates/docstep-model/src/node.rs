//! Persistent document nodes.
//!
//! Nodes are immutable and reference counted; every edit produces a new
//! tree that shares unchanged subtrees with the old one.
//!
//! Positions follow the usual token counting: a character of text is one
//! position, a leaf node is one position, and a node with content occupies
//! its content size plus one token each for its start and end.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::fragment::Fragment;
use crate::json::NodeJson;
use crate::mark::Mark;
use crate::replace;
use crate::resolve::ResolvedPos;
use crate::schema::NodeType;
use crate::slice::Slice;

/// Attribute map shared by nodes and marks.
pub type Attrs = BTreeMap<String, Value>;

struct TextContent {
    value: String,
    /// Length in chars.
    len: usize,
}

struct NodeInner {
    node_type: NodeType,
    attrs: Attrs,
    marks: Vec<Mark>,
    content: Fragment,
    text: Option<TextContent>,
}

/// A node in a document tree.
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

impl Node {
    /// Build a node without validation; callers go through [`NodeType::create`].
    pub(crate) fn new(node_type: NodeType, attrs: Attrs, content: Fragment, marks: Vec<Mark>) -> Self {
        Self(Arc::new(NodeInner {
            node_type,
            attrs,
            marks,
            content,
            text: None,
        }))
    }

    pub(crate) fn new_text(node_type: NodeType, text: String, marks: Vec<Mark>) -> Self {
        let len = text.chars().count();
        Self(Arc::new(NodeInner {
            node_type,
            attrs: Attrs::new(),
            marks,
            content: Fragment::empty(),
            text: Some(TextContent { value: text, len }),
        }))
    }

    pub fn node_type(&self) -> &NodeType {
        &self.0.node_type
    }

    pub fn attrs(&self) -> &Attrs {
        &self.0.attrs
    }

    pub fn marks(&self) -> &[Mark] {
        &self.0.marks
    }

    pub fn content(&self) -> &Fragment {
        &self.0.content
    }

    /// The text of a text node.
    pub fn text(&self) -> Option<&str> {
        self.0.text.as_ref().map(|t| t.value.as_str())
    }

    pub fn is_text(&self) -> bool {
        self.0.text.is_some()
    }

    pub fn is_inline(&self) -> bool {
        self.0.node_type.is_inline()
    }

    pub fn is_block(&self) -> bool {
        self.0.node_type.is_block()
    }

    pub fn is_textblock(&self) -> bool {
        self.0.node_type.is_textblock()
    }

    pub fn is_leaf(&self) -> bool {
        self.0.node_type.is_leaf()
    }

    /// Number of chars in a text node, zero for anything else.
    pub fn text_len(&self) -> usize {
        self.0.text.as_ref().map_or(0, |t| t.len)
    }

    /// Size of this node in positions.
    pub fn node_size(&self) -> usize {
        match &self.0.text {
            Some(text) => text.len,
            None if self.is_leaf() => 1,
            None => self.0.content.size() + 2,
        }
    }

    pub fn child_count(&self) -> usize {
        self.0.content.child_count()
    }

    pub fn child(&self, index: usize) -> &Node {
        self.0.content.child(index)
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.0.content.maybe_child(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.0.content.first_child()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.0.content.last_child()
    }

    /// Same type, attributes and marks (content and text are ignored).
    pub fn same_markup(&self, other: &Node) -> bool {
        self.has_markup(other.node_type(), other.attrs(), other.marks())
    }

    pub fn has_markup(&self, node_type: &NodeType, attrs: &Attrs, marks: &[Mark]) -> bool {
        &self.0.node_type == node_type && &self.0.attrs == attrs && self.0.marks.as_slice() == marks
    }

    /// Same markup, new content. Text nodes are returned unchanged.
    pub fn copy(&self, content: Fragment) -> Node {
        if self.is_text() {
            return self.clone();
        }
        Node::new(
            self.0.node_type.clone(),
            self.0.attrs.clone(),
            content,
            self.0.marks.clone(),
        )
    }

    /// Same node with a different mark set.
    pub fn mark(&self, marks: Vec<Mark>) -> Node {
        if self.0.marks == marks {
            return self.clone();
        }
        match &self.0.text {
            Some(text) => Node::new_text(self.0.node_type.clone(), text.value.clone(), marks),
            None => Node::new(
                self.0.node_type.clone(),
                self.0.attrs.clone(),
                self.0.content.clone(),
                marks,
            ),
        }
    }

    /// A text node with the same marks and different text.
    pub(crate) fn with_text(&self, text: String) -> Node {
        Node::new_text(self.0.node_type.clone(), text, self.0.marks.clone())
    }

    /// Cut out the part between `from` and `to`. Offsets are chars for text
    /// nodes and content positions otherwise.
    pub fn cut(&self, from: usize, to: usize) -> Node {
        match &self.0.text {
            Some(text) => {
                if from == 0 && to == text.len {
                    self.clone()
                } else {
                    self.with_text(char_slice(&text.value, from, to).to_string())
                }
            }
            None => {
                if from == 0 && to == self.0.content.size() {
                    self.clone()
                } else {
                    self.copy(self.0.content.cut(from, to))
                }
            }
        }
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        match &self.0.text {
            Some(text) => text.value.clone(),
            None => {
                let mut out = String::new();
                self.descendants(&mut |node, _, _| {
                    if let Some(text) = node.text() {
                        out.push_str(text);
                    }
                    true
                });
                out
            }
        }
    }

    /// Whether this node or any descendant carries marks.
    pub fn has_marks(&self) -> bool {
        !self.0.marks.is_empty() || self.0.content.iter().any(Node::has_marks)
    }

    /// A copy of this tree with every mark removed. Text that becomes
    /// adjacent with equal markup is merged.
    pub fn without_marks(&self) -> Node {
        if !self.has_marks() {
            return self.clone();
        }
        if self.is_text() {
            return self.mark(Vec::new());
        }
        let children = self.0.content.iter().map(Node::without_marks).collect();
        Node::new(
            self.0.node_type.clone(),
            self.0.attrs.clone(),
            Fragment::from_vec(children),
            Vec::new(),
        )
    }

    /// Resolve a position inside this node.
    pub fn resolve(&self, pos: usize) -> ModelResult<ResolvedPos> {
        ResolvedPos::resolve(self, pos)
    }

    /// The node starting at `pos`, or the text node containing it.
    pub fn node_at(&self, mut pos: usize) -> Option<Node> {
        let mut node = self;
        loop {
            let (index, offset) = node.content().find_index(pos).ok()?;
            let child = node.maybe_child(index)?;
            if offset == pos || child.is_text() {
                return Some(child.clone());
            }
            pos -= offset + 1;
            node = child;
        }
    }

    /// The slice of this node's content between two positions.
    pub fn slice(&self, from: usize, to: usize) -> ModelResult<Slice> {
        if from > to {
            return Err(ModelError::Replace(format!("invalid range {from}..{to}")));
        }
        if from == to {
            return Ok(Slice::empty());
        }
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        let depth = rfrom.shared_depth(to);
        let start = rfrom.start(depth);
        let node = rfrom.node(depth);
        let content = node.content().cut(rfrom.pos() - start, rto.pos() - start);
        Ok(Slice::new(content, rfrom.depth() - depth, rto.depth() - depth))
    }

    /// Replace the range `from..to` with a slice, producing a new tree.
    pub fn replace(&self, from: usize, to: usize, slice: &Slice) -> ModelResult<Node> {
        if from > to {
            return Err(ModelError::Replace(format!("invalid range {from}..{to}")));
        }
        replace::replace(&self.resolve(from)?, &self.resolve(to)?, slice)
    }

    /// Call `f` for every node overlapping `from..to` with its absolute
    /// position and parent. Returning false skips the node's children.
    pub fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F)
    where
        F: FnMut(&Node, usize, &Node) -> bool,
    {
        self.0.content.nodes_between(from, to, f, 0, self);
    }

    /// Call `f` for every descendant.
    pub fn descendants<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, usize, &Node) -> bool,
    {
        self.nodes_between(0, self.0.content.size(), f);
    }

    /// Validate this tree against its schema.
    pub fn check(&self) -> ModelResult<()> {
        let node_type = self.node_type();
        if let Some(text) = &self.0.text {
            if text.len == 0 {
                return Err(ModelError::invalid_content(
                    node_type.name(),
                    "empty text nodes are not allowed",
                ));
            }
        }
        if !self.0.marks.is_empty() && !self.is_inline() {
            return Err(ModelError::invalid_content(
                node_type.name(),
                "only inline nodes can carry marks",
            ));
        }
        if Mark::normalize_set(self.0.marks.clone()) != self.0.marks {
            return Err(ModelError::invalid_content(
                node_type.name(),
                "mark set is not normalized",
            ));
        }
        node_type.check_content(&self.0.content)?;
        for child in self.0.content.iter() {
            child.check()?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> NodeJson {
        NodeJson {
            node_type: self.node_type().name().to_string(),
            attrs: self.0.attrs.clone(),
            content: self.0.content.iter().map(Node::to_json).collect(),
            text: self.text().map(str::to_string),
            marks: self.0.marks.iter().map(Mark::to_json).collect(),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.same_markup(other) && self.text() == other.text() && self.0.content == other.0.content
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.text() {
            Some(text) => format!("{text:?}"),
            None if self.child_count() == 0 => self.node_type().name().to_string(),
            None => {
                let children: Vec<String> = self.0.content.iter().map(|c| c.to_string()).collect();
                format!("{}({})", self.node_type().name(), children.join(", "))
            }
        };
        let mut out = body;
        for mark in self.0.marks.iter().rev() {
            out = format!("{}({out})", mark.name());
        }
        f.write_str(&out)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Slice a string by char offsets.
pub(crate) fn char_slice(s: &str, from: usize, to: usize) -> &str {
    let start = byte_offset(s, from);
    let end = byte_offset(s, to);
    &s[start..end]
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn sizes() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "hello")]), hr(&s)]);
        assert_eq!(d.child(0).node_size(), 7);
        assert_eq!(d.child(1).node_size(), 1);
        assert_eq!(d.content().size(), 8);
        assert_eq!(d.node_size(), 10);
    }

    #[test]
    fn text_positions_count_chars() {
        let s = schema();
        let t = txt(&s, "héllo");
        assert_eq!(t.node_size(), 5);
        assert_eq!(t.cut(1, 3).text(), Some("él"));
    }

    #[test]
    fn display_shows_structure_and_marks() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "a "), em(&s, "b")])]);
        assert_eq!(d.to_string(), r#"doc(paragraph("a ", em("b")))"#);
    }

    #[test]
    fn structural_equality() {
        let s = schema();
        let a = doc(&s, vec![p(&s, vec![txt(&s, "x")])]);
        let b = doc(&s, vec![p(&s, vec![txt(&s, "x")])]);
        let c = doc(&s, vec![h(&s, 1, vec![txt(&s, "x")])]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn node_at_finds_nodes_and_text() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")]), hr(&s)]);
        assert_eq!(d.node_at(0).unwrap().node_type().name(), "paragraph");
        assert_eq!(d.node_at(2).unwrap().text(), Some("ab"));
        assert_eq!(d.node_at(4).unwrap().node_type().name(), "horizontal_rule");
        assert!(d.node_at(5).is_none());
    }

    #[test]
    fn slice_between_paragraphs_is_open() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")]), p(&s, vec![txt(&s, "cd")])]);
        let slice = d.slice(2, 6).unwrap();
        assert_eq!(slice.open_start(), 1);
        assert_eq!(slice.open_end(), 1);
        assert_eq!(slice.size(), 4);
        assert_eq!(
            slice.content().to_string(),
            r#"<paragraph("b"), paragraph("c")>"#
        );
    }

    #[test]
    fn text_content_concatenates() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")]), p(&s, vec![strong(&s, "cd")])]);
        assert_eq!(d.text_content(), "abcd");
    }

    #[test]
    fn without_marks_merges_text() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "a"), em(&s, "b"), txt(&s, "c")])]);
        let stripped = d.without_marks();
        assert!(!stripped.has_marks());
        assert_eq!(stripped.child(0).child_count(), 1);
        assert_eq!(stripped.to_string(), r#"doc(paragraph("abc"))"#);
    }

    #[test]
    fn check_accepts_valid_trees() {
        let s = schema();
        let d = doc(&s, vec![quote(&s, vec![p(&s, vec![em(&s, "x")])])]);
        assert!(d.check().is_ok());
    }

    #[test]
    fn nodes_between_reports_positions() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")]), p(&s, vec![txt(&s, "cd")])]);
        let mut seen = Vec::new();
        d.nodes_between(3, 6, &mut |node, pos, _| {
            seen.push((node.node_type().name().to_string(), pos));
            true
        });
        assert_eq!(
            seen,
            vec![
                ("paragraph".to_string(), 0),
                ("paragraph".to_string(), 4),
                ("text".to_string(), 5),
            ]
        );
    }
}
