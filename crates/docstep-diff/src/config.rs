use serde::{Deserialize, Serialize};

use crate::text_diff::Granularity;

/// Options controlling step reconstruction.
///
/// Keys are kebab-case when (de)serialized, with `word-level-text-diff`
/// and `simplify-result` for the text granularity and simplification
/// switches. Missing keys take their default values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RecreateOptions {
    /// Classify divergences into text, markup and structural edits and
    /// reconcile marks separately. When `false`, every divergence becomes
    /// one replace step.
    pub detailed_steps: bool,
    /// Diff text runs by words and whitespace instead of by characters.
    #[serde(rename = "word-level-text-diff", alias = "word-diffs")]
    pub word_diffs: bool,
    /// Merge adjacent steps after reconstruction.
    #[serde(rename = "simplify-result", alias = "simplify")]
    pub simplify: bool,
}

impl Default for RecreateOptions {
    fn default() -> Self {
        Self {
            detailed_steps: true,
            word_diffs: false,
            simplify: true,
        }
    }
}

impl RecreateOptions {
    /// Coarse reconstruction: one replace step per divergence.
    pub fn simple() -> Self {
        Self {
            detailed_steps: false,
            ..Default::default()
        }
    }

    /// Detailed reconstruction with word-level text edits.
    pub fn words() -> Self {
        Self {
            word_diffs: true,
            ..Default::default()
        }
    }

    pub fn granularity(&self) -> Granularity {
        if self.word_diffs {
            Granularity::Word
        } else {
            Granularity::Char
        }
    }
}
