//! Slices: fragments cut out of a document, possibly open on either side.

use std::fmt;

use crate::fragment::Fragment;
use crate::json::SliceJson;
use crate::node::Node;

/// A piece of document content.
///
/// `open_start` and `open_end` count how many levels of nodes at each side
/// of `content` were cut through and are missing their start or end token.
#[derive(Clone, Default, PartialEq)]
pub struct Slice {
    content: Fragment,
    open_start: usize,
    open_end: usize,
}

impl Slice {
    pub fn new(content: Fragment, open_start: usize, open_end: usize) -> Self {
        Self {
            content,
            open_start,
            open_end,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A closed slice holding the given nodes.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self::new(Fragment::from_vec(nodes), 0, 0)
    }

    pub fn content(&self) -> &Fragment {
        &self.content
    }

    pub fn open_start(&self) -> usize {
        self.open_start
    }

    pub fn open_end(&self) -> usize {
        self.open_end
    }

    /// Number of positions this slice adds when inserted.
    pub fn size(&self) -> usize {
        self.content
            .size()
            .saturating_sub(self.open_start + self.open_end)
    }

    pub fn is_empty(&self) -> bool {
        self.content.size() == 0
    }

    pub fn to_json(&self) -> SliceJson {
        SliceJson {
            content: self.content.iter().map(Node::to_json).collect(),
            open_start: self.open_start,
            open_end: self.open_end,
        }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.content, self.open_start, self.open_end)
    }
}

impl fmt::Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
