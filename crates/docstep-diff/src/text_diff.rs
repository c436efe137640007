//! Text diffing for text runs.
//!
//! Uses the `similar` crate (Myers diff) at character or word granularity,
//! then dissolves short equalities sandwiched between edits so that a
//! rewritten word comes out as one replacement rather than a scatter of
//! single-character edits around coincidentally shared letters.

use similar::{ChangeTag, TextDiff};

use crate::traits::TextDiffer;

/// Unit of comparison for text runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Granularity {
    #[default]
    Char,
    /// Words and the whitespace between them.
    Word,
}

/// What happened to a segment of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentTag {
    Unchanged,
    Added,
    Removed,
}

/// A piece of a text diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSegment {
    pub tag: SegmentTag,
    pub text: String,
}

impl TextSegment {
    pub fn new(tag: SegmentTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }

    /// Length in chars (document positions).
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Either a stretch of equal text or a group of consecutive edits.
#[derive(Debug)]
enum Chunk {
    Equal(String),
    Edit { removed: String, added: String },
}

impl Chunk {
    fn edit_weight(&self) -> Option<usize> {
        match self {
            Chunk::Edit { removed, added } => {
                Some(removed.chars().count().max(added.chars().count()))
            }
            Chunk::Equal(_) => None,
        }
    }
}

/// The default [`TextDiffer`], backed by `similar`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimilarTextDiff;

impl TextDiffer for SimilarTextDiff {
    fn diff(&self, old: &str, new: &str, granularity: Granularity) -> Vec<TextSegment> {
        let diff = match granularity {
            Granularity::Char => TextDiff::from_chars(old, new),
            Granularity::Word => TextDiff::from_words(old, new),
        };

        let mut chunks: Vec<Chunk> = Vec::new();
        for change in diff.iter_all_changes() {
            let value = change.value();
            match (change.tag(), chunks.last_mut()) {
                (ChangeTag::Equal, Some(Chunk::Equal(text))) => text.push_str(value),
                (ChangeTag::Equal, _) => chunks.push(Chunk::Equal(value.to_string())),
                (ChangeTag::Delete, Some(Chunk::Edit { removed, .. })) => removed.push_str(value),
                (ChangeTag::Insert, Some(Chunk::Edit { added, .. })) => added.push_str(value),
                (ChangeTag::Delete, _) => chunks.push(Chunk::Edit {
                    removed: value.to_string(),
                    added: String::new(),
                }),
                (ChangeTag::Insert, _) => chunks.push(Chunk::Edit {
                    removed: String::new(),
                    added: value.to_string(),
                }),
            }
        }

        cleanup_semantic(&mut chunks);
        to_segments(chunks)
    }
}

/// Fold an equality into its neighbouring edits when it is no longer than
/// the edits on both of its sides. Repeats until nothing changes.
fn cleanup_semantic(chunks: &mut Vec<Chunk>) {
    loop {
        let candidate = (1..chunks.len().saturating_sub(1)).find(|&i| {
            let Chunk::Equal(text) = &chunks[i] else {
                return false;
            };
            let len = text.chars().count();
            match (chunks[i - 1].edit_weight(), chunks[i + 1].edit_weight()) {
                (Some(before), Some(after)) => len <= before && len <= after,
                _ => false,
            }
        });
        let Some(i) = candidate else {
            return;
        };

        let mut merged_removed = String::new();
        let mut merged_added = String::new();
        for chunk in chunks.drain(i - 1..=i + 1) {
            match chunk {
                Chunk::Equal(text) => {
                    merged_removed.push_str(&text);
                    merged_added.push_str(&text);
                }
                Chunk::Edit { removed, added } => {
                    merged_removed.push_str(&removed);
                    merged_added.push_str(&added);
                }
            }
        }
        chunks.insert(
            i - 1,
            Chunk::Edit {
                removed: merged_removed,
                added: merged_added,
            },
        );
    }
}

fn to_segments(chunks: Vec<Chunk>) -> Vec<TextSegment> {
    let mut segments = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        match chunk {
            Chunk::Equal(text) => segments.push(TextSegment::new(SegmentTag::Unchanged, text)),
            Chunk::Edit { removed, added } => {
                if !removed.is_empty() {
                    segments.push(TextSegment::new(SegmentTag::Removed, removed));
                }
                if !added.is_empty() {
                    segments.push(TextSegment::new(SegmentTag::Added, added));
                }
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(segments: &[TextSegment]) -> String {
        segments
            .iter()
            .map(|s| match s.tag {
                SegmentTag::Unchanged => s.text.clone(),
                SegmentTag::Added => format!("+[{}]", s.text),
                SegmentTag::Removed => format!("-[{}]", s.text),
            })
            .collect()
    }

    fn rebuild(segments: &[TextSegment], keep: SegmentTag) -> String {
        segments
            .iter()
            .filter(|s| s.tag == SegmentTag::Unchanged || s.tag == keep)
            .map(|s| s.text.as_str())
            .collect()
    }

    #[test]
    fn rewritten_word_is_one_replacement() {
        let segments = SimilarTextDiff.diff("Hello world", "Hello there", Granularity::Char);
        assert_eq!(render(&segments), "Hello -[world]+[there]");
    }

    #[test]
    fn insertion_in_the_middle() {
        let segments = SimilarTextDiff.diff("abcd", "abXcd", Granularity::Char);
        assert_eq!(render(&segments), "ab+[X]cd");
    }

    #[test]
    fn deletion_at_the_end() {
        let segments = SimilarTextDiff.diff("abcdef", "abc", Granularity::Char);
        assert_eq!(render(&segments), "abc-[def]");
    }

    #[test]
    fn word_granularity_keeps_whole_words() {
        let segments = SimilarTextDiff.diff("the quick fox", "the slow fox", Granularity::Word);
        assert_eq!(render(&segments), "the -[quick]+[slow] fox");
    }

    #[test]
    fn identical_strings_are_one_unchanged_segment() {
        let segments = SimilarTextDiff.diff("same", "same", Granularity::Char);
        assert_eq!(segments, vec![TextSegment::new(SegmentTag::Unchanged, "same")]);
    }

    #[test]
    fn segments_rebuild_both_sides() {
        let cases = [
            ("kitten", "sitting"),
            ("a b c", "a x c d"),
            ("", "new"),
            ("old", ""),
            ("héllo wörld", "hello world"),
        ];
        for (old, new) in cases {
            for granularity in [Granularity::Char, Granularity::Word] {
                let segments = SimilarTextDiff.diff(old, new, granularity);
                assert_eq!(rebuild(&segments, SegmentTag::Removed), old);
                assert_eq!(rebuild(&segments, SegmentTag::Added), new);
                assert!(segments.iter().all(|s| !s.is_empty()));
            }
        }
    }

    #[test]
    fn segment_len_counts_chars() {
        assert_eq!(TextSegment::new(SegmentTag::Added, "wörld").len(), 5);
    }
}
