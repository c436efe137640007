//! Builders shared by the unit tests of this crate.

use docstep_model::{Attrs, Mark, Node, Schema};
use serde_json::json;

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

pub fn txt(s: &Schema, text: &str) -> Node {
    s.text(text, vec![]).unwrap()
}

pub fn em(s: &Schema, text: &str) -> Node {
    s.text(text, vec![mark(s, "em")]).unwrap()
}

pub fn strong(s: &Schema, text: &str) -> Node {
    s.text(text, vec![mark(s, "strong")]).unwrap()
}

pub fn mark(s: &Schema, name: &str) -> Mark {
    s.mark(name, Attrs::new()).unwrap()
}
