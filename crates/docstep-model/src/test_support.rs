//! Builders shared by the unit tests of this crate.

use serde_json::json;

use crate::node::{Attrs, Node};
use crate::schema::Schema;

pub fn schema() -> Schema {
    Schema::basic()
}

pub fn doc(s: &Schema, children: Vec<Node>) -> Node {
    s.node("doc", Attrs::new(), children).unwrap()
}

pub fn p(s: &Schema, children: Vec<Node>) -> Node {
    s.node("paragraph", Attrs::new(), children).unwrap()
}

pub fn h(s: &Schema, level: u64, children: Vec<Node>) -> Node {
    let mut attrs = Attrs::new();
    attrs.insert("level".into(), json!(level));
    s.node("heading", attrs, children).unwrap()
}

pub fn quote(s: &Schema, children: Vec<Node>) -> Node {
    s.node("blockquote", Attrs::new(), children).unwrap()
}

pub fn hr(s: &Schema) -> Node {
    s.node("horizontal_rule", Attrs::new(), vec![]).unwrap()
}

pub fn txt(s: &Schema, text: &str) -> Node {
    s.text(text, vec![]).unwrap()
}

pub fn em(s: &Schema, text: &str) -> Node {
    marked(s, text, &["em"])
}

pub fn strong(s: &Schema, text: &str) -> Node {
    marked(s, text, &["strong"])
}

pub fn marked(s: &Schema, text: &str, marks: &[&str]) -> Node {
    let marks = marks
        .iter()
        .map(|name| s.mark(name, Attrs::new()).unwrap())
        .collect();
    s.text(text, marks).unwrap()
}
