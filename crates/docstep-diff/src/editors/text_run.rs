//! Character or word edits inside one text run.

use docstep_model::Slice;
use docstep_transform::Transform;
use tracing::debug;

use crate::classify::TextDivergence;
use crate::error::RecreateResult;
use crate::text_diff::{Granularity, SegmentTag, TextSegment};
use crate::traits::TextDiffer;

/// Emits insert, delete and replace steps for a text divergence.
pub struct TextRunEditor<'a> {
    differ: &'a dyn TextDiffer,
    granularity: Granularity,
}

impl<'a> TextRunEditor<'a> {
    pub fn new(differ: &'a dyn TextDiffer, granularity: Granularity) -> Self {
        Self {
            differ,
            granularity,
        }
    }

    /// Diff the two full runs and apply the edits to `tr`, starting at the
    /// run's position. Inserted text takes the marks found after the
    /// insertion point in the current document.
    pub fn apply(&self, tr: &mut Transform, divergence: &TextDivergence) -> RecreateResult<()> {
        let segments: Vec<TextSegment> = self
            .differ
            .diff(
                &divergence.current_text,
                &divergence.target_text,
                self.granularity,
            )
            .into_iter()
            .filter(|segment| !segment.is_empty())
            .collect();

        let mut offset = divergence.run_start;
        let mut i = 0;
        while i < segments.len() {
            let segment = &segments[i];
            if segment.tag == SegmentTag::Unchanged {
                offset += segment.len();
                i += 1;
                continue;
            }

            let partner = segments
                .get(i + 1)
                .filter(|next| next.tag != SegmentTag::Unchanged && next.tag != segment.tag);
            i += if partner.is_some() { 2 } else { 1 };
            let (removed, added) = match segment.tag {
                SegmentTag::Removed => (Some(segment), partner),
                _ => (partner, Some(segment)),
            };

            let deleted = removed.map_or(0, TextSegment::len);
            match added {
                Some(added) => {
                    let marks = tr.doc().resolve(offset)?.marks_after();
                    let schema = tr.doc().node_type().schema().clone();
                    let text = schema.text(&added.text, marks)?;
                    debug!(from = offset, to = offset + deleted, text = %added.text, "text edit");
                    tr.replace(offset, offset + deleted, Slice::from_nodes(vec![text]))?;
                    offset += added.len();
                }
                None => {
                    debug!(from = offset, to = offset + deleted, "text deletion");
                    tr.delete(offset, offset + deleted)?;
                }
            }
        }
        Ok(())
    }
}
