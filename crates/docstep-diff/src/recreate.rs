//! The reconstruction driver.
//!
//! Detailed mode repeatedly locates the first divergence between the
//! unmarked current document and the unmarked target, classifies it and
//! hands it to the matching editor, then reconciles marks. Simple mode
//! emits one replace step per divergence of the full documents.

use docstep_model::Node;
use docstep_transform::{Step, Transform};
use tracing::debug;

use crate::boundary::BoundaryResolver;
use crate::classify::{DiffClassifier, Divergence};
use crate::config::RecreateOptions;
use crate::editors::{MarkupEditor, StructuralEditor, TextRunEditor};
use crate::error::{RecreateError, RecreateMode, RecreateResult};
use crate::locate::{DiffWindow, DivergenceLocator, TreeContentDiff};
use crate::marks::MarkReconciler;
use crate::simplify::MergeSimplifier;
use crate::text_diff::SimilarTextDiff;
use crate::traits::{ContentDiff, Simplifier, TextDiffer};

/// Consecutive iterations either loop may run without the divergence
/// moving forward or shrinking.
pub const MAX_ITERATIONS: usize = 1000;

/// Absolute bound on iterations of either loop, progress or not.
pub const MAX_TOTAL_ITERATIONS: usize = 1_000_000;

/// Tracks whether a reconstruction loop is still making progress.
///
/// An iteration makes progress when its divergence starts later than any
/// earlier one, or starts at the furthest start seen so far and covers
/// fewer positions.
struct ConvergenceGuard {
    mode: RecreateMode,
    iterations: usize,
    stalled: usize,
    best: Option<(usize, usize)>,
}

impl ConvergenceGuard {
    fn new(mode: RecreateMode) -> Self {
        Self {
            mode,
            iterations: 0,
            stalled: 0,
            best: None,
        }
    }

    /// Record one iteration whose divergence starts at `start` and covers
    /// `span` positions across both documents.
    fn advance(&mut self, start: usize, span: usize) -> RecreateResult<usize> {
        self.iterations += 1;
        let progressed = match self.best {
            None => true,
            Some((best_start, best_span)) => {
                start > best_start || (start == best_start && span < best_span)
            }
        };
        if progressed {
            self.best = Some((start, span));
            self.stalled = 0;
        } else {
            self.stalled += 1;
        }
        if self.stalled >= MAX_ITERATIONS || self.iterations > MAX_TOTAL_ITERATIONS {
            return Err(RecreateError::NonConvergence {
                mode: self.mode,
                iterations: self.iterations,
            });
        }
        Ok(self.iterations)
    }
}

/// Recreates the steps turning one document into another.
pub struct Recreator {
    options: RecreateOptions,
    content: Box<dyn ContentDiff>,
    text: Box<dyn TextDiffer>,
    simplifier: Box<dyn Simplifier>,
}

impl Recreator {
    pub fn new(options: RecreateOptions) -> Self {
        Self {
            options,
            content: Box::new(TreeContentDiff),
            text: Box::new(SimilarTextDiff),
            simplifier: Box::new(MergeSimplifier),
        }
    }

    pub fn with_content_diff(mut self, content: Box<dyn ContentDiff>) -> Self {
        self.content = content;
        self
    }

    pub fn with_text_differ(mut self, text: Box<dyn TextDiffer>) -> Self {
        self.text = text;
        self
    }

    pub fn with_simplifier(mut self, simplifier: Box<dyn Simplifier>) -> Self {
        self.simplifier = simplifier;
        self
    }

    pub fn options(&self) -> &RecreateOptions {
        &self.options
    }

    /// Build a transform that starts at `from` and ends at `to`.
    pub fn recreate(&self, from: &Node, to: &Node) -> RecreateResult<Transform> {
        if !from.same_markup(to) {
            return Err(RecreateError::IncompatibleRoots {
                current: root_label(from),
                target: root_label(to),
            });
        }

        let mut tr = Transform::new(from.clone());
        if self.options.detailed_steps {
            self.recreate_detailed(&mut tr, to)?;
        } else {
            self.recreate_simple(&mut tr, to)?;
        }

        let recreated = tr.steps().len();
        if self.options.simplify && recreated > 1 {
            tr = self.simplifier.simplify(tr)?;
        }
        if tr.doc() != to {
            return Err(RecreateError::invariant(
                "recreated steps do not produce the target document",
            ));
        }

        debug!(
            detailed = self.options.detailed_steps,
            recreated,
            steps = tr.steps().len(),
            "recreated transform"
        );
        Ok(tr)
    }

    fn recreate_detailed(&self, tr: &mut Transform, target: &Node) -> RecreateResult<()> {
        let locator = DivergenceLocator::new(self.content.as_ref());
        let text_editor = TextRunEditor::new(self.text.as_ref(), self.options.granularity());
        let structural_editor = StructuralEditor::new(&locator);
        let target_text = target.without_marks();

        let mut guard = ConvergenceGuard::new(RecreateMode::Detailed);
        loop {
            let current_text = tr.doc().without_marks();
            let Some(window) = locator.locate(&current_text, &target_text)? else {
                break;
            };
            let iterations = guard.advance(window.start, window_span(window))?;

            let divergence = DiffClassifier.classify(&current_text, &target_text, window)?;
            debug!(
                iteration = iterations,
                kind = divergence.kind(),
                start = window.start,
                end_current = window.end_current,
                end_target = window.end_target,
                "divergence"
            );
            match divergence {
                Divergence::Text(text) => text_editor.apply(tr, &text)?,
                Divergence::Markup { window, .. } => MarkupEditor.apply(tr, target, window)?,
                Divergence::Structural { .. } => structural_editor.apply(tr, target)?,
            }
        }

        MarkReconciler.reconcile(tr, target)
    }

    fn recreate_simple(&self, tr: &mut Transform, target: &Node) -> RecreateResult<()> {
        let locator = DivergenceLocator::new(self.content.as_ref());
        let mut guard = ConvergenceGuard::new(RecreateMode::Simple);
        while let Some(step) = BoundaryResolver.replace_step(&locator, tr.doc(), target)? {
            let iterations = match &step {
                Step::Replace { from, to, slice } => {
                    guard.advance(*from, (to - from) + slice.size())?
                }
                _ => {
                    return Err(RecreateError::invariant(
                        "simple mode produced a non-replace step",
                    ))
                }
            };
            debug!(iteration = iterations, step = %step, "replace");
            tr.step(step)?;
        }
        Ok(())
    }
}

impl Default for Recreator {
    fn default() -> Self {
        Self::new(RecreateOptions::default())
    }
}

fn window_span(window: DiffWindow) -> usize {
    window.end_current.saturating_sub(window.start) + window.end_target.saturating_sub(window.start)
}

fn root_label(node: &Node) -> String {
    format!("{} {:?}", node.node_type().name(), node.attrs())
}

/// Recreate the steps between two documents with the default capabilities.
pub fn recreate_transform(from: &Node, to: &Node, options: &RecreateOptions) -> RecreateResult<Transform> {
    Recreator::new(options.clone()).recreate(from, to)
}

#[cfg(test)]
mod tests {
    use docstep_model::{
        Attrs, ContentKind, DiffEnd, NodeSpec, Schema, SchemaSpec, Slice, TEXT_NODE,
    };
    use serde_json::json;

    use super::*;
    use crate::test_support::*;
    use crate::text_diff::{Granularity, SegmentTag, TextSegment};

    fn detailed(from: &Node, to: &Node) -> Vec<Step> {
        recreate_transform(from, to, &RecreateOptions::default())
            .unwrap()
            .into_steps()
    }

    #[test]
    fn changed_word_is_one_text_replace() {
        let s = schema();
        let a = doc(&s, vec![p(&s, vec![txt(&s, "Hello world")])]);
        let b = doc(&s, vec![p(&s, vec![txt(&s, "Hello there")])]);
        assert_eq!(
            detailed(&a, &b),
            vec![Step::Replace {
                from: 7,
                to: 12,
                slice: Slice::from_nodes(vec![txt(&s, "there")]),
            }]
        );
    }

    #[test]
    fn paragraph_to_heading_is_one_markup_step() {
        let s = schema();
        let a = doc(&s, vec![p(&s, vec![txt(&s, "x")])]);
        let b = doc(&s, vec![h(&s, 1, vec![txt(&s, "x")])]);
        let steps = detailed(&a, &b);
        let [Step::SetNodeMarkup { pos: 0, node_type: Some(node_type), attrs, marks }] = steps.as_slice() else {
            panic!("expected one set-node-markup step, got {steps:?}");
        };
        assert_eq!(node_type.name(), "heading");
        assert_eq!(attrs.get("level"), Some(&json!(1)));
        assert!(marks.is_empty());
    }

    #[test]
    fn swapped_emphasis_is_mark_steps_only() {
        let s = schema();
        let a = doc(&s, vec![p(&s, vec![em(&s, "Hello")])]);
        let b = doc(&s, vec![p(&s, vec![strong(&s, "Hello")])]);
        assert_eq!(
            detailed(&a, &b),
            vec![
                Step::RemoveMark {
                    from: 1,
                    to: 6,
                    mark: mark(&s, "em"),
                },
                Step::AddMark {
                    from: 1,
                    to: 6,
                    mark: mark(&s, "strong"),
                },
            ]
        );
    }

    #[test]
    fn joined_paragraphs_are_one_replace() {
        let s = schema();
        let a = doc(&s, vec![p(&s, vec![txt(&s, "a")]), p(&s, vec![txt(&s, "b")])]);
        let b = doc(&s, vec![p(&s, vec![txt(&s, "ab")])]);
        assert_eq!(
            detailed(&a, &b),
            vec![Step::Replace {
                from: 2,
                to: 4,
                slice: Slice::empty(),
            }]
        );
    }

    #[test]
    fn identical_documents_have_no_steps() {
        let s = schema();
        let a = doc(
            &s,
            vec![
                h(&s, 2, vec![txt(&s, "Title")]),
                p(&s, vec![txt(&s, "a "), em(&s, "b")]),
            ],
        );
        assert!(detailed(&a, &a).is_empty());
        let simple = recreate_transform(&a, &a, &RecreateOptions::simple()).unwrap();
        assert!(simple.steps().is_empty());
    }

    #[test]
    fn text_edits_stay_inside_the_run() {
        let s = schema();
        let a = doc(
            &s,
            vec![
                p(&s, vec![txt(&s, "first block")]),
                p(&s, vec![txt(&s, "the quick brown fox")]),
                p(&s, vec![txt(&s, "last")]),
            ],
        );
        let b = doc(
            &s,
            vec![
                p(&s, vec![txt(&s, "first block")]),
                p(&s, vec![txt(&s, "the quiet brown box")]),
                p(&s, vec![txt(&s, "last")]),
            ],
        );
        // The second paragraph's text runs from 14 to 33.
        let steps = detailed(&a, &b);
        assert!(!steps.is_empty());
        for step in &steps {
            let Step::Replace { from, to, slice } = step else {
                panic!("unexpected step {step}");
            };
            assert!(*from >= 14 && *to <= 33, "{step} leaves the run");
            assert_eq!(slice.open_start(), 0);
            assert_eq!(slice.open_end(), 0);
        }
    }

    #[test]
    fn markup_change_is_exactly_one_step() {
        let s = schema();
        let a = doc(
            &s,
            vec![p(&s, vec![txt(&s, "x")]), h(&s, 1, vec![txt(&s, "y")])],
        );
        let b = doc(
            &s,
            vec![p(&s, vec![txt(&s, "x")]), h(&s, 2, vec![txt(&s, "y")])],
        );
        let steps = detailed(&a, &b);
        assert!(
            matches!(steps.as_slice(), [Step::SetNodeMarkup { pos: 3, node_type: None, .. }]),
            "{steps:?}"
        );
    }

    #[test]
    fn mark_changes_emit_no_replace() {
        let s = schema();
        let a = doc(
            &s,
            vec![
                p(&s, vec![txt(&s, "plain "), strong(&s, "bold")]),
                p(&s, vec![txt(&s, "more")]),
            ],
        );
        let b = doc(
            &s,
            vec![
                p(&s, vec![em(&s, "plain "), txt(&s, "bold")]),
                p(&s, vec![txt(&s, "mo"), strong(&s, "re")]),
            ],
        );
        let steps = detailed(&a, &b);
        assert!(!steps.is_empty());
        assert!(steps
            .iter()
            .all(|step| matches!(step, Step::AddMark { .. } | Step::RemoveMark { .. })));
    }

    #[test]
    fn inserted_block_and_text_edit() {
        let s = schema();
        let a = doc(
            &s,
            vec![p(&s, vec![txt(&s, "one")]), p(&s, vec![txt(&s, "three")])],
        );
        let b = doc(
            &s,
            vec![
                p(&s, vec![txt(&s, "one")]),
                quote(&s, vec![p(&s, vec![txt(&s, "two")])]),
                p(&s, vec![txt(&s, "three!")]),
            ],
        );
        let tr = recreate_transform(&a, &b, &RecreateOptions::default()).unwrap();
        assert_eq!(tr.doc(), &b);
        assert_eq!(tr.before(), &a);
    }

    #[test]
    fn simple_mode_replaces_marked_text() {
        let s = schema();
        let a = doc(&s, vec![p(&s, vec![em(&s, "Hello")])]);
        let b = doc(&s, vec![p(&s, vec![strong(&s, "Hello")])]);
        let tr = recreate_transform(&a, &b, &RecreateOptions::simple()).unwrap();
        assert_eq!(
            tr.steps(),
            &[Step::Replace {
                from: 1,
                to: 6,
                slice: Slice::from_nodes(vec![strong(&s, "Hello")]),
            }]
        );
    }

    #[test]
    fn word_mode_replaces_whole_words() {
        let s = schema();
        let a = doc(&s, vec![p(&s, vec![txt(&s, "the quick fox")])]);
        let b = doc(&s, vec![p(&s, vec![txt(&s, "the slow fox")])]);
        let tr = recreate_transform(&a, &b, &RecreateOptions::words()).unwrap();
        assert_eq!(
            tr.steps(),
            &[Step::Replace {
                from: 5,
                to: 10,
                slice: Slice::from_nodes(vec![txt(&s, "slow")]),
            }]
        );
    }

    #[test]
    fn different_roots_are_rejected() {
        let spec = SchemaSpec {
            top: "doc".into(),
            nodes: vec![
                NodeSpec::block("doc", ContentKind::Block).with_attr("version", json!(1)),
                NodeSpec::block("paragraph", ContentKind::Inline),
                NodeSpec::inline(TEXT_NODE),
            ],
            marks: vec![],
        };
        let s = Schema::new(spec).unwrap();
        let mut v2 = Attrs::new();
        v2.insert("version".into(), json!(2));
        let a = s.node("doc", Attrs::new(), vec![]).unwrap();
        let b = s.node("doc", v2, vec![]).unwrap();

        let err = recreate_transform(&a, &b, &RecreateOptions::default()).unwrap_err();
        assert!(matches!(err, RecreateError::IncompatibleRoots { .. }));
    }

    fn many_paragraphs(s: &Schema, text: &str) -> Node {
        let paragraphs = (0..=MAX_ITERATIONS).map(|_| p(s, vec![txt(s, text)])).collect();
        doc(s, paragraphs)
    }

    #[test]
    fn many_separate_edits_converge() {
        let s = schema();
        let a = many_paragraphs(&s, "ab");
        let b = many_paragraphs(&s, "aX");

        let tr = recreate_transform(&a, &b, &RecreateOptions::default()).unwrap();
        assert_eq!(tr.doc(), &b);
        assert_eq!(tr.steps().len(), MAX_ITERATIONS + 1);
        let replayed = tr
            .steps()
            .iter()
            .try_fold(a.clone(), |doc, step| step.apply(&doc))
            .unwrap();
        assert_eq!(replayed, b);

        let tr = recreate_transform(&a, &b, &RecreateOptions::simple()).unwrap();
        assert_eq!(tr.doc(), &b);
        let replayed = tr
            .steps()
            .iter()
            .try_fold(a.clone(), |doc, step| step.apply(&doc))
            .unwrap();
        assert_eq!(replayed, b);
    }

    // ------------------------------------------------------------------
    // Injected capabilities
    // ------------------------------------------------------------------

    /// Always reports a divergence at the very start that ends there too.
    struct StuckContentDiff;

    impl ContentDiff for StuckContentDiff {
        fn diff_start(&self, _: &Node, _: &Node) -> Option<usize> {
            Some(0)
        }

        fn diff_end(&self, _: &Node, _: &Node) -> Option<DiffEnd> {
            Some(DiffEnd { a: 0, b: 0 })
        }
    }

    fn stuck_pair() -> (Node, Node) {
        let s = schema();
        (
            doc(&s, vec![p(&s, vec![txt(&s, "a")])]),
            doc(&s, vec![p(&s, vec![txt(&s, "b")])]),
        )
    }

    #[test]
    fn detailed_loop_gives_up() {
        let (a, b) = stuck_pair();
        let err = Recreator::default()
            .with_content_diff(Box::new(StuckContentDiff))
            .recreate(&a, &b)
            .unwrap_err();
        assert!(matches!(
            err,
            RecreateError::NonConvergence {
                mode: RecreateMode::Detailed,
                iterations,
            } if iterations > MAX_ITERATIONS && iterations < MAX_TOTAL_ITERATIONS
        ));
    }

    #[test]
    fn simple_loop_gives_up() {
        let (a, b) = stuck_pair();
        let err = Recreator::new(RecreateOptions::simple())
            .with_content_diff(Box::new(StuckContentDiff))
            .recreate(&a, &b)
            .unwrap_err();
        assert!(matches!(
            err,
            RecreateError::NonConvergence {
                mode: RecreateMode::Simple,
                iterations,
            } if iterations > MAX_ITERATIONS && iterations < MAX_TOTAL_ITERATIONS
        ));
    }

    /// Replaces the whole run in one segment pair.
    struct WholeRun;

    impl TextDiffer for WholeRun {
        fn diff(&self, old: &str, new: &str, _: Granularity) -> Vec<TextSegment> {
            vec![
                TextSegment::new(SegmentTag::Removed, old),
                TextSegment::new(SegmentTag::Added, new),
            ]
        }
    }

    #[test]
    fn injected_text_differ_is_used() {
        let s = schema();
        let a = doc(&s, vec![p(&s, vec![txt(&s, "Hello world")])]);
        let b = doc(&s, vec![p(&s, vec![txt(&s, "Hello there")])]);
        let tr = Recreator::default()
            .with_text_differ(Box::new(WholeRun))
            .recreate(&a, &b)
            .unwrap();
        assert_eq!(
            tr.steps(),
            &[Step::Replace {
                from: 1,
                to: 12,
                slice: Slice::from_nodes(vec![txt(&s, "Hello there")]),
            }]
        );
    }

    /// Drops every step.
    struct Forgetful;

    impl Simplifier for Forgetful {
        fn simplify(&self, tr: Transform) -> RecreateResult<Transform> {
            Ok(Transform::new(tr.before().clone()))
        }
    }

    #[test]
    fn broken_simplifier_is_caught() {
        let s = schema();
        let a = doc(&s, vec![p(&s, vec![em(&s, "Hello")])]);
        let b = doc(&s, vec![p(&s, vec![strong(&s, "Hello")])]);
        let err = Recreator::default()
            .with_simplifier(Box::new(Forgetful))
            .recreate(&a, &b)
            .unwrap_err();
        assert!(matches!(err, RecreateError::Invariant(_)));

        let no_simplify = RecreateOptions {
            simplify: false,
            ..Default::default()
        };
        let tr = Recreator::new(no_simplify)
            .with_simplifier(Box::new(Forgetful))
            .recreate(&a, &b)
            .unwrap();
        assert_eq!(tr.steps().len(), 2);
    }
}
