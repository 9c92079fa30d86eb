use std::str::FromStr;

use crate::classify::{CollapsedItem, collapse_compounds};
use crate::error::ConfigError;
use crate::lexicon::Lexicon;
use crate::models::{Label, Occurrence, Token, Utterance, mor};

/// Strictness variant for the vocative test.
///
/// One enumerated parameter instead of per-script copies of the heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    /// Vocative requires comma adjacency only.
    Strict,
    /// Comma adjacency or standalone utterance.
    Default,
    /// Additionally treats the utterance-initial position as vocative.
    Loose,
}

impl Heuristic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Heuristic::Strict => "strict",
            Heuristic::Default => "default",
            Heuristic::Loose => "loose",
        }
    }

    /// All variants, in the order sensitivity tables report them.
    pub fn all() -> [Heuristic; 3] {
        [Heuristic::Default, Heuristic::Strict, Heuristic::Loose]
    }
}

impl Default for Heuristic {
    fn default() -> Self {
        Heuristic::Default
    }
}

impl FromStr for Heuristic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Heuristic::Strict),
            "default" => Ok(Heuristic::Default),
            "loose" => Ok(Heuristic::Loose),
            other => Err(ConfigError::UnknownHeuristic(other.to_string())),
        }
    }
}

/// Classifies kinship-term occurrences in one utterance as vocative,
/// bare-argument, or determined-argument.
///
/// Single-pass and stateless per call; the only per-utterance state is the
/// standalone flag and the token position.
#[derive(Debug, Clone)]
pub struct Classifier {
    lexicon: Lexicon,
    heuristic: Heuristic,
}

impl Classifier {
    pub fn new(lexicon: Lexicon, heuristic: Heuristic) -> Self {
        Self { lexicon, heuristic }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Produce all kinship-term occurrences in the utterance.
    ///
    /// Tie-break order is fixed: the vocative test runs first; determiner
    /// detection beats the title+name override (a determined form is
    /// already out of the bare bucket and is never relabeled).
    pub fn classify(&self, utt: &Utterance) -> Vec<Occurrence> {
        let tokens = &utt.tokens;

        // Word positions only: normalize, drop noise, remember where each
        // word sits in the original token sequence so comma checks work.
        let mut word_norm: Vec<String> = Vec::new();
        let mut word_raw: Vec<&str> = Vec::new();
        let mut word_token_idx: Vec<usize> = Vec::new();
        for (idx, tok) in tokens.iter().enumerate() {
            if !tok.is_word() || Lexicon::is_noise(&tok.raw) {
                continue;
            }
            word_norm.push(self.lexicon.normalize(&tok.raw));
            word_raw.push(tok.raw.as_str());
            word_token_idx.push(idx);
        }
        if word_norm.is_empty() {
            return Vec::new();
        }

        let items = collapse_compounds(&self.lexicon, &word_norm);

        // Standalone: after removing discourse particles, everything left
        // is a kinship term ("Mommy!", "hi Grandma").
        let filtered: Vec<&CollapsedItem> = items
            .iter()
            .filter(|item| {
                !self.lexicon.is_discourse(&item.lexeme) && !Lexicon::is_noise(&item.lexeme)
            })
            .collect();
        let standalone =
            !filtered.is_empty() && filtered.iter().all(|item| self.lexicon.is_term(&item.lexeme));
        let initial_start = filtered.first().map(|item| item.start_word);

        let mut occurrences = Vec::new();
        for item in &items {
            let Some(category) = self.lexicon.category(&item.lexeme) else {
                continue;
            };
            let start_token = word_token_idx[item.start_word];
            let end_token = word_token_idx[item.end_word];
            let comma = comma_adjacent(tokens, start_token, end_token);

            let is_vocative = match self.heuristic {
                Heuristic::Strict => comma,
                Heuristic::Default => comma || standalone,
                Heuristic::Loose => {
                    comma || standalone || initial_start == Some(item.start_word)
                }
            };

            let (label, title_name) = if is_vocative {
                (Label::Vocative, false)
            } else if self.has_determiner(&word_norm, &word_raw, item) {
                (Label::DeterminedArgument, false)
            } else if !item.is_compound()
                && self.lexicon.is_title_capable(&item.lexeme)
                && mor::followed_by_proper_noun(&utt.mor, item.start_word, &item.lexeme)
            {
                // Title+name: the following name is the head, so this is
                // not a referring bare argument.
                (Label::DeterminedArgument, true)
            } else {
                (Label::BareArgument, false)
            };

            occurrences.push(Occurrence {
                term: item.lexeme.clone(),
                label,
                category,
                start_token,
                end_token,
                title_name,
            });
        }
        occurrences
    }

    /// Determiner status of an argument use: genitive marking on the term
    /// itself, a determiner or genitive immediately before it, or the
    /// coordination pattern `det + kin + and/or + kin`.
    fn has_determiner(&self, word_norm: &[String], word_raw: &[&str], item: &CollapsedItem) -> bool {
        if Lexicon::has_genitive(word_raw[item.end_word]) {
            return true;
        }
        let Some(j) = item.start_word.checked_sub(1) else {
            return false;
        };
        if self.lexicon.is_determiner(&word_norm[j]) || Lexicon::has_genitive(word_raw[j]) {
            return true;
        }
        if self.lexicon.is_conjunction(&word_norm[j]) && j >= 2 {
            if self.lexicon.is_term(&word_norm[j - 1])
                && (self.lexicon.is_determiner(&word_norm[j - 2])
                    || Lexicon::has_genitive(word_raw[j - 2]))
            {
                return true;
            }
        }
        false
    }
}

/// The comma-offset vocative construction: a comma token immediately
/// before the match start or after the match end.
fn comma_adjacent(tokens: &[Token], start_token: usize, end_token: usize) -> bool {
    if start_token > 0 && tokens[start_token - 1].is_comma() {
        return true;
    }
    tokens.get(end_token + 1).is_some_and(|t| t.is_comma())
}
