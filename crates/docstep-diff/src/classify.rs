//! Classifying a divergence as a text, markup or structural change.

use docstep_model::Node;

use crate::error::RecreateResult;
use crate::locate::DiffWindow;

/// A divergence inside one text run.
#[derive(Clone, Debug, PartialEq)]
pub struct TextDivergence {
    pub window: DiffWindow,
    /// Position where the text run containing the divergence starts.
    pub run_start: usize,
    /// Full text of the run in the current document.
    pub current_text: String,
    /// Full text of the run in the target document.
    pub target_text: String,
}

/// A classified divergence.
#[derive(Clone, Debug, PartialEq)]
pub enum Divergence {
    /// Text of one run changed; structure around it is the same.
    Text(TextDivergence),
    /// A node changed type, attributes or marks but kept its content.
    Markup {
        window: DiffWindow,
        current: Node,
        target: Node,
    },
    /// Anything else.
    Structural {
        window: DiffWindow,
        current: Option<Node>,
        target: Option<Node>,
    },
}

impl Divergence {
    pub fn window(&self) -> DiffWindow {
        match self {
            Divergence::Text(text) => text.window,
            Divergence::Markup { window, .. } | Divergence::Structural { window, .. } => *window,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Divergence::Text(_) => "text",
            Divergence::Markup { .. } => "markup",
            Divergence::Structural { .. } => "structural",
        }
    }
}

/// Labels divergence windows using the nodes found at their start.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiffClassifier;

impl DiffClassifier {
    pub fn classify(&self, current: &Node, target: &Node, window: DiffWindow) -> RecreateResult<Divergence> {
        let node_current = current.node_at(window.start);
        let node_target = target.node_at(window.start);

        if let (Some(a), Some(b)) = (&node_current, &node_target) {
            if a.is_text() && b.is_text() {
                if let Some(text) = text_divergence(current, target, window, a, b)? {
                    return Ok(Divergence::Text(text));
                }
            } else if !a.is_text() && !b.is_text() && !a.same_markup(b) && a.content() == b.content() {
                return Ok(Divergence::Markup {
                    window,
                    current: a.clone(),
                    target: b.clone(),
                });
            }
        }

        Ok(Divergence::Structural {
            window,
            current: node_current,
            target: node_target,
        })
    }
}

/// Both nodes are text at `window.start`. The divergence is a text change
/// when the runs sit in equivalent textblocks at the same depth, start at
/// the same position and share a non-empty prefix.
fn text_divergence(
    current: &Node,
    target: &Node,
    window: DiffWindow,
    a: &Node,
    b: &Node,
) -> RecreateResult<Option<TextDivergence>> {
    if !a.same_markup(b) {
        return Ok(None);
    }
    let rc = current.resolve(window.start)?;
    let rt = target.resolve(window.start)?;
    if rc.depth() != rt.depth() {
        return Ok(None);
    }
    if !rc.parent().is_textblock() || !rc.parent().same_markup(rt.parent()) {
        return Ok(None);
    }
    let run_start = rc.pos() - rc.text_offset();
    if run_start != rt.pos() - rt.text_offset() {
        return Ok(None);
    }
    let (Some(ta), Some(tb)) = (a.text(), b.text()) else {
        return Ok(None);
    };
    if ta == tb {
        return Ok(None);
    }
    let common = ta
        .chars()
        .zip(tb.chars())
        .take_while(|(x, y)| x == y)
        .count();
    if common == 0 && !ta.is_empty() && !tb.is_empty() {
        return Ok(None);
    }
    Ok(Some(TextDivergence {
        window,
        run_start,
        current_text: ta.to_string(),
        target_text: tb.to_string(),
    }))
}
