//! Fragments: ordered, normalized child lists.

use std::fmt;

use crate::error::{ModelError, ModelResult};
use crate::node::Node;

/// Positions at which two fragments stop matching, scanning from the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffEnd {
    /// End of the difference in the receiver.
    pub a: usize,
    /// End of the difference in the other fragment.
    pub b: usize,
}

/// A sequence of sibling nodes.
///
/// Fragments never contain empty text, and adjacent text nodes with the
/// same marks are always merged into one.
#[derive(Clone, Default, PartialEq)]
pub struct Fragment {
    content: Vec<Node>,
    size: usize,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fragment, dropping empty text and merging adjacent text nodes
    /// with equal markup.
    pub fn from_vec(nodes: Vec<Node>) -> Self {
        let mut content: Vec<Node> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if node.is_text() && node.text_len() == 0 {
                continue;
            }
            if let Some(last) = content.last_mut() {
                if let (Some(a), Some(b)) = (last.text(), node.text()) {
                    if last.same_markup(&node) {
                        *last = last.with_text(format!("{a}{b}"));
                        continue;
                    }
                }
            }
            content.push(node);
        }
        let size = content.iter().map(Node::node_size).sum();
        Self { content, size }
    }

    pub fn from_node(node: Node) -> Self {
        Self::from_vec(vec![node])
    }

    /// Total size of the children in positions.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn child(&self, index: usize) -> &Node {
        &self.content[index]
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.content.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.content.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.content.iter()
    }

    pub fn children(&self) -> &[Node] {
        &self.content
    }

    /// Concatenate two fragments, merging text at the seam.
    pub fn append(&self, other: &Fragment) -> Fragment {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut nodes = self.content.clone();
        nodes.extend(other.content.iter().cloned());
        Fragment::from_vec(nodes)
    }

    /// The part of this fragment between two content positions.
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to == self.size {
            return self.clone();
        }
        let mut result = Vec::new();
        if to > from {
            let mut pos = 0;
            for child in &self.content {
                if pos >= to {
                    break;
                }
                let end = pos + child.node_size();
                if end > from {
                    let piece = if pos < from || end > to {
                        if child.is_text() {
                            child.cut(from.saturating_sub(pos), child.text_len().min(to - pos))
                        } else {
                            child.cut(
                                from.saturating_sub(pos + 1),
                                child.content().size().min(to.saturating_sub(pos + 1)),
                            )
                        }
                    } else {
                        child.clone()
                    };
                    result.push(piece);
                }
                pos = end;
            }
        }
        Fragment::from_vec(result)
    }

    /// Replace the child at `index`.
    pub fn replace_child(&self, index: usize, node: Node) -> Fragment {
        let mut nodes = self.content.clone();
        nodes[index] = node;
        Fragment::from_vec(nodes)
    }

    /// Find the child containing `pos`: its index and start offset. A
    /// position on a child boundary maps to the child after it.
    pub fn find_index(&self, pos: usize) -> ModelResult<(usize, usize)> {
        if pos == 0 {
            return Ok((0, 0));
        }
        if pos == self.size {
            return Ok((self.content.len(), pos));
        }
        if pos > self.size {
            return Err(ModelError::PositionOutOfRange {
                pos,
                size: self.size,
            });
        }
        let mut cur = 0;
        for (i, child) in self.content.iter().enumerate() {
            let end = cur + child.node_size();
            if end >= pos {
                if end == pos {
                    return Ok((i + 1, end));
                }
                return Ok((i, cur));
            }
            cur = end;
        }
        Err(ModelError::PositionOutOfRange {
            pos,
            size: self.size,
        })
    }

    /// First position at which this fragment and `other` differ, or `None`
    /// if they are equal. `pos` is the absolute position of the fragments'
    /// start.
    pub fn find_diff_start(&self, other: &Fragment, mut pos: usize) -> Option<usize> {
        let mut i = 0;
        loop {
            if i == self.child_count() || i == other.child_count() {
                return if self.child_count() == other.child_count() {
                    None
                } else {
                    Some(pos)
                };
            }
            let (a, b) = (self.child(i), other.child(i));
            if a == b {
                pos += a.node_size();
                i += 1;
                continue;
            }
            if !a.same_markup(b) {
                return Some(pos);
            }
            if let (Some(ta), Some(tb)) = (a.text(), b.text()) {
                let same = ta
                    .chars()
                    .zip(tb.chars())
                    .take_while(|(x, y)| x == y)
                    .count();
                return Some(pos + same);
            }
            if a.content().size() > 0 || b.content().size() > 0 {
                if let Some(inner) = a.content().find_diff_start(b.content(), pos + 1) {
                    return Some(inner);
                }
            }
            pos += a.node_size();
            i += 1;
        }
    }

    /// Last positions (in each fragment) at which they differ, scanning
    /// backwards from `pos_a` and `pos_b`, the absolute end positions.
    pub fn find_diff_end(&self, other: &Fragment, mut pos_a: usize, mut pos_b: usize) -> Option<DiffEnd> {
        let (mut i_a, mut i_b) = (self.child_count(), other.child_count());
        loop {
            if i_a == 0 || i_b == 0 {
                return if i_a == i_b {
                    None
                } else {
                    Some(DiffEnd { a: pos_a, b: pos_b })
                };
            }
            i_a -= 1;
            i_b -= 1;
            let (a, b) = (self.child(i_a), other.child(i_b));
            let size = a.node_size();
            if a == b {
                pos_a -= size;
                pos_b -= size;
                continue;
            }
            if !a.same_markup(b) {
                return Some(DiffEnd { a: pos_a, b: pos_b });
            }
            if let (Some(ta), Some(tb)) = (a.text(), b.text()) {
                let same = ta
                    .chars()
                    .rev()
                    .zip(tb.chars().rev())
                    .take_while(|(x, y)| x == y)
                    .count();
                return Some(DiffEnd {
                    a: pos_a - same,
                    b: pos_b - same,
                });
            }
            if a.content().size() > 0 || b.content().size() > 0 {
                if let Some(inner) = a.content().find_diff_end(b.content(), pos_a - 1, pos_b - 1) {
                    return Some(inner);
                }
            }
            pos_a -= size;
            pos_b -= size;
        }
    }

    /// Walk the nodes overlapping `from..to` (relative to this fragment).
    pub(crate) fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F, node_start: usize, parent: &Node)
    where
        F: FnMut(&Node, usize, &Node) -> bool,
    {
        let mut pos = 0;
        for child in &self.content {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, node_start + pos, parent) && child.content().size() > 0 {
                let start = pos + 1;
                child.content().nodes_between(
                    from.saturating_sub(start),
                    child.content().size().min(to - start),
                    f,
                    node_start + start,
                    child,
                );
            }
            pos = end;
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<String> = self.content.iter().map(|c| c.to_string()).collect();
        write!(f, "<{}>", children.join(", "))
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<'a> IntoIterator for &'a Fragment {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}
