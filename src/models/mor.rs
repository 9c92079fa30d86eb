use serde::{Deserialize, Serialize};

/// Alignment between surface words and %mor entries is positional and
/// approximate; lookups search this many positions either side of the
/// expected index. A known source of misclassification risk on heavily
/// cliticized utterances.
pub const ALIGN_WINDOW: usize = 2;

/// One entry of the morphological annotation tier: a part-of-speech tag
/// and a lowercased lemma with inflectional suffixes stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorEntry {
    pub pos: String,
    pub lemma: String,
}

impl MorEntry {
    pub fn is_proper_noun(&self) -> bool {
        self.pos == "n:prop"
    }
}

/// Parse the content of a `%mor:` tier line into aligned entries.
///
/// Splits on whitespace, discards punctuation tokens, splits clitic
/// compounds on `~` into separate entries, then splits each entry on the
/// first `|` into (pos, lemma). Inflectional material after `&` is
/// dropped from the lemma. Tokens without a `|` keep an `unk` tag.
pub fn parse_mor_tier(content: &str) -> Vec<MorEntry> {
    let mut entries = Vec::new();
    for tok in content.split_whitespace() {
        if tok.chars().all(|c| ".,!?;:".contains(c)) {
            continue;
        }
        for sub in tok.split('~') {
            let entry = match sub.split_once('|') {
                Some((pos, lemma)) => {
                    let lemma = lemma.split('&').next().unwrap_or(lemma);
                    MorEntry {
                        pos: pos.to_string(),
                        lemma: lemma.to_lowercase(),
                    }
                }
                None => MorEntry {
                    pos: "unk".to_string(),
                    lemma: sub.to_lowercase(),
                },
            };
            entries.push(entry);
        }
    }
    entries
}

/// Whether the entry matching `term` near `expected_idx` is immediately
/// followed by a proper noun.
///
/// Searches `expected_idx` ± [`ALIGN_WINDOW`] for an entry whose lemma is
/// the term (or a prefix of it, since %mor lemmas omit inflection), then
/// inspects that entry's successor. Returns false on an absent tier, so
/// callers degrade to surface-only heuristics.
pub fn followed_by_proper_noun(entries: &[MorEntry], expected_idx: usize, term: &str) -> bool {
    if entries.is_empty() {
        return false;
    }
    let lo = expected_idx.saturating_sub(ALIGN_WINDOW);
    let hi = (expected_idx + ALIGN_WINDOW + 1).min(entries.len());
    for i in lo..hi {
        let entry = &entries[i];
        if entry.lemma == term || (!entry.lemma.is_empty() && term.starts_with(entry.lemma.as_str()))
        {
            return entries.get(i + 1).is_some_and(|next| next.is_proper_noun());
        }
    }
    false
}
