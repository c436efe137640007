//! Atomic document edits.

use std::fmt;

use docstep_model::{Attrs, Fragment, Mark, Node, NodeType, Slice};

use crate::error::{StepError, StepResult};
use crate::map::StepMap;

/// A single edit that can be applied to a document.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Replace the range `from..to` with a slice.
    Replace { from: usize, to: usize, slice: Slice },
    /// Change the type, attributes and marks of the node starting at `pos`,
    /// keeping its content. `node_type: None` keeps the current type.
    SetNodeMarkup {
        pos: usize,
        node_type: Option<NodeType>,
        attrs: Attrs,
        marks: Vec<Mark>,
    },
    /// Add a mark to every inline node in `from..to`.
    AddMark { from: usize, to: usize, mark: Mark },
    /// Remove a mark from every inline node in `from..to`.
    RemoveMark { from: usize, to: usize, mark: Mark },
}

impl Step {
    /// Apply the step, producing a new document.
    pub fn apply(&self, doc: &Node) -> StepResult<Node> {
        match self {
            Step::Replace { from, to, slice } => {
                check_range(doc, *from, *to)?;
                Ok(doc.replace(*from, *to, slice)?)
            }
            Step::SetNodeMarkup {
                pos,
                node_type,
                attrs,
                marks,
            } => apply_markup(doc, *pos, node_type.as_ref(), attrs, marks),
            Step::AddMark { from, to, mark } => {
                apply_mark(doc, *from, *to, |marks| mark.add_to_set(marks))
            }
            Step::RemoveMark { from, to, mark } => {
                apply_mark(doc, *from, *to, |marks| mark.remove_from_set(marks))
            }
        }
    }

    /// How positions move when this step is applied.
    pub fn get_map(&self) -> StepMap {
        match self {
            Step::Replace { from, to, slice } => StepMap::replaced(*from, to - from, slice.size()),
            _ => StepMap::empty(),
        }
    }

    /// A step that undoes this one. `doc` is the document before this step.
    pub fn invert(&self, doc: &Node) -> StepResult<Step> {
        match self {
            Step::Replace { from, to, slice } => {
                check_range(doc, *from, *to)?;
                Ok(Step::Replace {
                    from: *from,
                    to: from + slice.size(),
                    slice: doc.slice(*from, *to)?,
                })
            }
            Step::SetNodeMarkup { pos, .. } => {
                let node = markup_target(doc, *pos)?;
                Ok(Step::SetNodeMarkup {
                    pos: *pos,
                    node_type: Some(node.node_type().clone()),
                    attrs: node.attrs().clone(),
                    marks: node.marks().to_vec(),
                })
            }
            Step::AddMark { from, to, mark } => Ok(Step::RemoveMark {
                from: *from,
                to: *to,
                mark: mark.clone(),
            }),
            Step::RemoveMark { from, to, mark } => Ok(Step::AddMark {
                from: *from,
                to: *to,
                mark: mark.clone(),
            }),
        }
    }

    /// Combine this step with the step applied directly after it into one
    /// step with the same effect, where possible.
    pub fn merge(&self, other: &Step) -> Option<Step> {
        match (self, other) {
            (
                Step::Replace { from, to, slice },
                Step::Replace {
                    from: other_from,
                    to: other_to,
                    slice: other_slice,
                },
            ) => {
                if from + slice.size() == *other_from
                    && slice.open_end() == 0
                    && other_slice.open_start() == 0
                {
                    let merged = if slice.size() + other_slice.size() == 0 {
                        Slice::empty()
                    } else {
                        Slice::new(
                            slice.content().append(other_slice.content()),
                            slice.open_start(),
                            other_slice.open_end(),
                        )
                    };
                    Some(Step::Replace {
                        from: *from,
                        to: to + (other_to - other_from),
                        slice: merged,
                    })
                } else if *other_to == *from
                    && slice.open_start() == 0
                    && other_slice.open_end() == 0
                {
                    let merged = if slice.size() + other_slice.size() == 0 {
                        Slice::empty()
                    } else {
                        Slice::new(
                            other_slice.content().append(slice.content()),
                            other_slice.open_start(),
                            slice.open_end(),
                        )
                    };
                    Some(Step::Replace {
                        from: *other_from,
                        to: *to,
                        slice: merged,
                    })
                } else {
                    None
                }
            }
            (
                Step::AddMark { from, to, mark },
                Step::AddMark {
                    from: other_from,
                    to: other_to,
                    mark: other_mark,
                },
            ) if mark == other_mark && from <= other_to && to >= other_from => Some(Step::AddMark {
                from: *from.min(other_from),
                to: *to.max(other_to),
                mark: mark.clone(),
            }),
            (
                Step::RemoveMark { from, to, mark },
                Step::RemoveMark {
                    from: other_from,
                    to: other_to,
                    mark: other_mark,
                },
            ) if mark == other_mark && from <= other_to && to >= other_from => {
                Some(Step::RemoveMark {
                    from: *from.min(other_from),
                    to: *to.max(other_to),
                    mark: mark.clone(),
                })
            }
            _ => None,
        }
    }

    /// Short name used in logs and text output.
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Replace { .. } => "replace",
            Step::SetNodeMarkup { .. } => "set-node-markup",
            Step::AddMark { .. } => "add-mark",
            Step::RemoveMark { .. } => "remove-mark",
        }
    }
}

fn check_range(doc: &Node, from: usize, to: usize) -> StepResult<()> {
    let size = doc.content().size();
    if from > to || to > size {
        return Err(StepError::OutOfRange { from, to, size });
    }
    Ok(())
}

fn markup_target(doc: &Node, pos: usize) -> StepResult<Node> {
    let size = doc.content().size();
    if pos >= size {
        return Err(StepError::OutOfRange {
            from: pos,
            to: pos,
            size,
        });
    }
    let node = doc.node_at(pos).ok_or(StepError::NoNodeAt(pos))?;
    if node.is_text() {
        return Err(StepError::TextNode(pos));
    }
    Ok(node)
}

fn apply_markup(
    doc: &Node,
    pos: usize,
    node_type: Option<&NodeType>,
    attrs: &Attrs,
    marks: &[Mark],
) -> StepResult<Node> {
    let node = markup_target(doc, pos)?;
    let new_type = node_type.unwrap_or(node.node_type());
    if !marks.is_empty() && !new_type.is_inline() {
        return Err(StepError::MarksNotAllowed(new_type.name().to_string()));
    }
    let updated = new_type.create(attrs.clone(), node.content().clone(), marks.to_vec())?;
    let slice = Slice::new(Fragment::from_node(updated), 0, 0);
    Ok(doc.replace(pos, pos + node.node_size(), &slice)?)
}

fn apply_mark<F>(doc: &Node, from: usize, to: usize, update: F) -> StepResult<Node>
where
    F: Fn(&[Mark]) -> Vec<Mark>,
{
    check_range(doc, from, to)?;
    let old = doc.slice(from, to)?;
    let content = map_inline(old.content(), &update);
    let slice = Slice::new(content, old.open_start(), old.open_end());
    Ok(doc.replace(from, to, &slice)?)
}

/// Rebuild a fragment with the marks of every inline node updated.
fn map_inline<F>(fragment: &Fragment, update: &F) -> Fragment
where
    F: Fn(&[Mark]) -> Vec<Mark>,
{
    let children = fragment
        .iter()
        .map(|child| {
            if child.is_inline() {
                child.mark(update(child.marks()))
            } else if child.content().size() > 0 {
                child.copy(map_inline(child.content(), update))
            } else {
                child.clone()
            }
        })
        .collect();
    Fragment::from_vec(children)
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Replace { from, to, slice } => {
                write!(f, "replace {from}..{to} {slice}")
            }
            Step::SetNodeMarkup {
                pos,
                node_type,
                attrs,
                marks,
            } => {
                write!(f, "set-node-markup {pos}")?;
                if let Some(node_type) = node_type {
                    write!(f, " {node_type}")?;
                }
                if !attrs.is_empty() {
                    let attrs = serde_json::to_string(attrs).map_err(|_| fmt::Error)?;
                    write!(f, " {attrs}")?;
                }
                for mark in marks {
                    write!(f, " +{mark}")?;
                }
                Ok(())
            }
            Step::AddMark { from, to, mark } => write!(f, "add-mark {from}..{to} {mark}"),
            Step::RemoveMark { from, to, mark } => write!(f, "remove-mark {from}..{to} {mark}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::*;

    // -----------------------------------------------------------------------
    // apply
    // -----------------------------------------------------------------------

    #[test]
    fn replace_applies_slice() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "hello world")])]);
        let step = Step::Replace {
            from: 7,
            to: 12,
            slice: Slice::from_nodes(vec![txt(&s, "there")]),
        };
        let out = step.apply(&d).unwrap();
        assert_eq!(out.to_string(), r#"doc(paragraph("hello there"))"#);
    }

    #[test]
    fn replace_out_of_range_fails() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")])]);
        let step = Step::Replace {
            from: 1,
            to: 9,
            slice: Slice::empty(),
        };
        assert_eq!(
            step.apply(&d).unwrap_err(),
            StepError::OutOfRange { from: 1, to: 9, size: 4 }
        );
    }

    #[test]
    fn set_node_markup_changes_type_and_attrs() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "Title")])]);
        let mut attrs = Attrs::new();
        attrs.insert("level".into(), json!(1));
        let step = Step::SetNodeMarkup {
            pos: 0,
            node_type: Some(s.node_type("heading").unwrap()),
            attrs,
            marks: vec![],
        };
        let out = step.apply(&d).unwrap();
        assert_eq!(out, doc(&s, vec![h(&s, 1, vec![txt(&s, "Title")])]));
    }

    #[test]
    fn set_node_markup_rejects_text_and_missing_nodes() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")])]);
        let on_text = Step::SetNodeMarkup {
            pos: 1,
            node_type: None,
            attrs: Attrs::new(),
            marks: vec![],
        };
        assert_eq!(on_text.apply(&d).unwrap_err(), StepError::TextNode(1));

        let past_end = Step::SetNodeMarkup {
            pos: 4,
            node_type: None,
            attrs: Attrs::new(),
            marks: vec![],
        };
        assert!(matches!(past_end.apply(&d), Err(StepError::OutOfRange { .. })));
    }

    #[test]
    fn set_node_markup_rejects_marks_on_blocks() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")])]);
        let step = Step::SetNodeMarkup {
            pos: 0,
            node_type: None,
            attrs: Attrs::new(),
            marks: vec![mark(&s, "em")],
        };
        assert_eq!(
            step.apply(&d).unwrap_err(),
            StepError::MarksNotAllowed("paragraph".into())
        );
    }

    #[test]
    fn set_node_markup_rejects_incompatible_content() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")])]);
        let step = Step::SetNodeMarkup {
            pos: 0,
            node_type: Some(s.node_type("blockquote").unwrap()),
            attrs: Attrs::new(),
            marks: vec![],
        };
        assert!(matches!(step.apply(&d), Err(StepError::Model(_))));
    }

    #[test]
    fn add_and_remove_mark() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "hello world")])]);
        let add = Step::AddMark {
            from: 1,
            to: 6,
            mark: mark(&s, "strong"),
        };
        let marked = add.apply(&d).unwrap();
        assert_eq!(
            marked,
            doc(&s, vec![p(&s, vec![strong(&s, "hello"), txt(&s, " world")])])
        );

        let remove = Step::RemoveMark {
            from: 3,
            to: 12,
            mark: mark(&s, "strong"),
        };
        let out = remove.apply(&marked).unwrap();
        assert_eq!(
            out,
            doc(&s, vec![p(&s, vec![strong(&s, "he"), txt(&s, "llo world")])])
        );
    }

    #[test]
    fn mark_steps_span_blocks() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")]), p(&s, vec![txt(&s, "cd")])]);
        let step = Step::AddMark {
            from: 2,
            to: 6,
            mark: mark(&s, "em"),
        };
        let out = step.apply(&d).unwrap();
        assert_eq!(
            out,
            doc(
                &s,
                vec![
                    p(&s, vec![txt(&s, "a"), em(&s, "b")]),
                    p(&s, vec![em(&s, "c"), txt(&s, "d")]),
                ]
            )
        );
    }

    // -----------------------------------------------------------------------
    // invert / map / merge
    // -----------------------------------------------------------------------

    #[test]
    fn invert_restores_document() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "ab")]), p(&s, vec![txt(&s, "cd")])]);
        let steps = vec![
            Step::Replace {
                from: 2,
                to: 6,
                slice: Slice::empty(),
            },
            Step::SetNodeMarkup {
                pos: 0,
                node_type: Some(s.node_type("heading").unwrap()),
                attrs: Attrs::new(),
                marks: vec![],
            },
            Step::AddMark {
                from: 1,
                to: 3,
                mark: mark(&s, "code"),
            },
        ];
        for step in steps {
            let after = step.apply(&d).unwrap();
            let inverse = step.invert(&d).unwrap();
            assert_eq!(inverse.apply(&after).unwrap(), d, "inverting {step}");
        }
    }

    #[test]
    fn replace_map_covers_changed_range() {
        let step = Step::Replace {
            from: 3,
            to: 5,
            slice: Slice::empty(),
        };
        let map = step.get_map();
        assert_eq!(map.map(10, crate::map::Assoc::After), 8);
        let mark_step = Step::AddMark {
            from: 3,
            to: 5,
            mark: mark(&schema(), "em"),
        };
        assert!(mark_step.get_map().is_empty());
    }

    #[test]
    fn adjacent_replaces_merge() {
        let s = schema();
        let d = doc(&s, vec![p(&s, vec![txt(&s, "abcdef")])]);
        let first = Step::Replace {
            from: 2,
            to: 3,
            slice: Slice::from_nodes(vec![txt(&s, "X")]),
        };
        let second = Step::Replace {
            from: 3,
            to: 4,
            slice: Slice::from_nodes(vec![txt(&s, "Y")]),
        };
        let merged = first.merge(&second).unwrap();
        let expected = second.apply(&first.apply(&d).unwrap()).unwrap();
        assert_eq!(merged.apply(&d).unwrap(), expected);
        assert_eq!(
            merged,
            Step::Replace {
                from: 2,
                to: 4,
                slice: Slice::from_nodes(vec![txt(&s, "XY")]),
            }
        );
    }

    #[test]
    fn distant_replaces_do_not_merge() {
        let first = Step::Replace {
            from: 2,
            to: 3,
            slice: Slice::empty(),
        };
        let second = Step::Replace {
            from: 5,
            to: 6,
            slice: Slice::empty(),
        };
        assert!(first.merge(&second).is_none());
    }

    #[test]
    fn overlapping_mark_steps_merge() {
        let s = schema();
        let em_mark = mark(&s, "em");
        let a = Step::AddMark {
            from: 1,
            to: 4,
            mark: em_mark.clone(),
        };
        let b = Step::AddMark {
            from: 4,
            to: 8,
            mark: em_mark.clone(),
        };
        assert_eq!(
            a.merge(&b),
            Some(Step::AddMark {
                from: 1,
                to: 8,
                mark: em_mark.clone(),
            })
        );
        let other = Step::AddMark {
            from: 4,
            to: 8,
            mark: mark(&s, "strong"),
        };
        assert!(a.merge(&other).is_none());
    }

    #[test]
    fn display_is_compact() {
        let s = schema();
        let step = Step::AddMark {
            from: 1,
            to: 6,
            mark: mark(&s, "strong"),
        };
        assert_eq!(step.to_string(), "add-mark 1..6 strong");
        let step = Step::Replace {
            from: 7,
            to: 12,
            slice: Slice::from_nodes(vec![txt(&s, "there")]),
        };
        assert_eq!(step.to_string(), r#"replace 7..12 <"there">(0,0)"#);
    }
}
