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

pub fn quote(s: &Schema, children: Vec<Node>) -> Node {
    s.node("blockquote", Attrs::new(), children).unwrap()
}

pub fn hr(s: &Schema) -> Node {
    s.node("horizontal_rule", Attrs::new(), vec![]).unwrap()
}

pub fn br(s: &Schema) -> Node {
    s.node("hard_break", Attrs::new(), vec![]).unwrap()
}

pub fn image(s: &Schema, src: &str, marks: &[&str]) -> Node {
    let mut attrs = Attrs::new();
    attrs.insert("src".into(), json!(src));
    let marks = marks.iter().map(|name| mark(s, name)).collect();
    s.node("image", attrs, vec![]).unwrap().mark(marks)
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
    let marks = marks.iter().map(|name| mark(s, name)).collect();
    s.text(text, marks).unwrap()
}

pub fn mark(s: &Schema, name: &str) -> Mark {
    s.mark(name, Attrs::new()).unwrap()
}

pub fn link(s: &Schema, href: &str) -> Mark {
    let mut attrs = Attrs::new();
    attrs.insert("href".into(), json!(href));
    s.mark("link", attrs).unwrap()
}
