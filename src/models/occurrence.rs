use serde::{Deserialize, Serialize};

/// Semantic category of a kinship term, fixed by lexicon membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Parent,
    Grandparent,
    Extended,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Parent => "parent",
            Category::Grandparent => "grandparent",
            Category::Extended => "extended",
        }
    }

    /// Stratum used by manual QC and confusion categories: grandparent
    /// terms fall into the extended bucket there.
    pub fn audit_stratum(&self) -> &'static str {
        match self {
            Category::Parent => "parent",
            Category::Grandparent | Category::Extended => "extended",
        }
    }
}

/// Classification assigned to one kinship-term occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Vocative,
    BareArgument,
    DeterminedArgument,
}

impl Label {
    pub fn is_vocative(&self) -> bool {
        matches!(self, Label::Vocative)
    }

    pub fn is_argument(&self) -> bool {
        !self.is_vocative()
    }

    /// Coarse vocative/argument name used in QC strata and label files.
    pub fn coarse_str(&self) -> &'static str {
        if self.is_vocative() { "vocative" } else { "argument" }
    }
}

/// One classified kinship-term instance within an utterance.
///
/// `start_token..=end_token` index the utterance's original token sequence
/// (including punctuation); a two-word compound spans two word tokens.
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occurrence {
    /// Normalized lexeme, possibly a collapsed compound.
    pub term: String,
    pub label: Label,
    pub category: Category,
    /// Index of the first token of the match.
    pub start_token: usize,
    /// Index of the last token of the match.
    pub end_token: usize,
    /// Whether the determined label came from the title+name override.
    pub title_name: bool,
}
