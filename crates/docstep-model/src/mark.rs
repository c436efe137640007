//! Marks and mark sets.
//!
//! A mark set is a `Vec<Mark>` kept sorted by mark type rank, holding at
//! most one mark per type. Adding a mark of a type already present replaces
//! the existing one.

use std::fmt;

use crate::json::MarkJson;
use crate::node::Attrs;
use crate::schema::MarkType;

/// A mark instance: a type plus attributes.
#[derive(Clone, PartialEq)]
pub struct Mark {
    mark_type: MarkType,
    attrs: Attrs,
}

impl Mark {
    pub(crate) fn new(mark_type: MarkType, attrs: Attrs) -> Self {
        Self { mark_type, attrs }
    }

    pub fn mark_type(&self) -> &MarkType {
        &self.mark_type
    }

    pub fn name(&self) -> &str {
        self.mark_type.name()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Marks of the same type exclude each other.
    pub fn excludes(&self, other: &Mark) -> bool {
        self.mark_type == other.mark_type
    }

    /// Return a copy of `set` with this mark added in rank order.
    pub fn add_to_set(&self, set: &[Mark]) -> Vec<Mark> {
        let mut out = Vec::with_capacity(set.len() + 1);
        let mut placed = false;
        for other in set {
            if other == self {
                return set.to_vec();
            }
            if self.excludes(other) {
                continue;
            }
            if !placed && other.mark_type.rank() > self.mark_type.rank() {
                out.push(self.clone());
                placed = true;
            }
            out.push(other.clone());
        }
        if !placed {
            out.push(self.clone());
        }
        out
    }

    /// Return a copy of `set` without this exact mark.
    pub fn remove_from_set(&self, set: &[Mark]) -> Vec<Mark> {
        set.iter().filter(|m| *m != self).cloned().collect()
    }

    pub fn is_in_set(&self, set: &[Mark]) -> bool {
        set.contains(self)
    }

    /// Build a well-formed set from arbitrary marks. Later marks win over
    /// earlier marks of the same type.
    pub fn normalize_set(marks: Vec<Mark>) -> Vec<Mark> {
        marks
            .iter()
            .fold(Vec::new(), |set, mark| mark.add_to_set(&set))
    }

    pub fn to_json(&self) -> MarkJson {
        MarkJson {
            mark_type: self.name().to_string(),
            attrs: self.attrs.clone(),
        }
    }
}

impl fmt::Debug for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attrs.is_empty() {
            f.write_str(self.name())
        } else {
            write!(f, "{}{:?}", self.name(), self.attrs)
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
