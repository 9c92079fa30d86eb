use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::Lexicon;
use crate::models::MorEntry;

/// Words (letters with internal hyphens/apostrophes) plus the punctuation
/// marks that matter for comma-offset vocative detection.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+(?:[-'’][A-Za-z]+)*|[.,!?]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Punct,
}

/// A single orthographic word or punctuation mark from an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub raw: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn is_comma(&self) -> bool {
        self.kind == TokenKind::Punct && self.raw == ","
    }
}

/// One speaker turn: speaker code, tokenized text, and the optional
/// morphological tier. Utterance order within a transcript is meaningful
/// for the adjacency analyses.
#[derive(Debug, Clone)]
pub struct Utterance {
    /// Speaker code from the `*XXX:` prefix, uppercased.
    pub speaker: String,
    /// Raw utterance text after the speaker delimiter, trimmed.
    pub text: String,
    pub tokens: Vec<Token>,
    /// Parsed %mor tier; empty when the transcript carries none.
    pub mor: Vec<MorEntry>,
    /// Transcript path relative to the corpus root.
    pub file: PathBuf,
    /// 1-based line number of the speaker line.
    pub line_no: usize,
}

impl Utterance {
    pub fn is_child(&self) -> bool {
        self.speaker == "CHI"
    }

    /// Count of word tokens excluding noise markers; the denominator for
    /// per-million rates.
    pub fn surface_word_count(&self) -> u64 {
        self.tokens
            .iter()
            .filter(|t| t.is_word() && !Lexicon::is_noise(&t.raw))
            .count() as u64
    }
}

/// Split utterance text into word and punctuation tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| {
            let raw = m.as_str().to_string();
            let kind = if raw.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                TokenKind::Word
            } else {
                TokenKind::Punct
            };
            Token { raw, kind }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utt(text: &str) -> Utterance {
        Utterance {
            speaker: "MOT".to_string(),
            text: text.to_string(),
            tokens: tokenize(text),
            mor: Vec::new(),
            file: PathBuf::from("test.cha"),
            line_no: 1,
        }
    }

    #[test]
    fn test_tokenize_words_and_punct() {
        let tokens = tokenize("look , Mommy !");
        let raws: Vec<&str> = tokens.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(raws, vec!["look", ",", "Mommy", "!"]);
        assert!(tokens[0].is_word());
        assert!(tokens[1].is_comma());
        assert!(!tokens[3].is_word());
    }

    #[test]
    fn test_tokenize_keeps_internal_apostrophes() {
        let tokens = tokenize("that's mom's book .");
        let raws: Vec<&str> = tokens.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(raws, vec!["that's", "mom's", "book", "."]);
    }

    #[test]
    fn test_surface_word_count_excludes_noise() {
        let u = utt("I saw xxx mom .");
        assert_eq!(u.surface_word_count(), 3);
    }

    #[test]
    fn test_is_child() {
        let mut u = utt("hi .");
        assert!(!u.is_child());
        u.speaker = "CHI".to_string();
        assert!(u.is_child());
    }
}
