use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::classify::Classifier;
use crate::lexicon::Lexicon;
use crate::models::{Category, Label, Utterance};
use crate::stats::percent;

/// Which terms one utterance uses vocatively, as bare arguments, and as
/// determined arguments.
#[derive(Debug, Clone, Default)]
pub struct TermSets {
    pub vocative: HashSet<String>,
    pub bare: HashSet<String>,
    pub determined: HashSet<String>,
}

/// Collapse an utterance's occurrences into per-label term sets.
pub fn utterance_term_sets(classifier: &Classifier, utt: &Utterance) -> TermSets {
    let mut sets = TermSets::default();
    for occ in classifier.classify(utt) {
        match occ.label {
            Label::Vocative => sets.vocative.insert(occ.term),
            Label::BareArgument => sets.bare.insert(occ.term),
            Label::DeterminedArgument => sets.determined.insert(occ.term),
        };
    }
    sets
}

/// Cross-utterance transition counts for the bridging-context analysis:
/// what follows a vocative use of a term, and whether a bare argument was
/// preceded by a vocative of the same term.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyCounts {
    voc_then_bare: HashMap<String, u64>,
    voc_then_det: HashMap<String, u64>,
    voc_then_voc: HashMap<String, u64>,
    voc_then_none: HashMap<String, u64>,
    voc_total: HashMap<String, u64>,
    bare_total: HashMap<String, u64>,
    bare_preceded_by_voc: HashMap<String, u64>,
    bare_not_preceded: HashMap<String, u64>,
}

fn bump(map: &mut HashMap<String, u64>, term: &str) {
    *map.entry(term.to_string()).or_insert(0) += 1;
}

impl AdjacencyCounts {
    /// Record one transcript's utterances, in order. Adjacency is only
    /// meaningful within a single transcript, so callers feed one file at
    /// a time.
    pub fn record_transcript(&mut self, classifier: &Classifier, utterances: &[Utterance]) {
        let sets: Vec<TermSets> = utterances
            .iter()
            .map(|utt| utterance_term_sets(classifier, utt))
            .collect();

        for (i, current) in sets.iter().enumerate() {
            for term in &current.vocative {
                bump(&mut self.voc_total, term);
            }
            for term in &current.bare {
                bump(&mut self.bare_total, term);
            }

            if i > 0 {
                let prev = &sets[i - 1];
                for term in &current.bare {
                    if prev.vocative.contains(term) {
                        bump(&mut self.bare_preceded_by_voc, term);
                    } else {
                        bump(&mut self.bare_not_preceded, term);
                    }
                }
            }

            if let Some(next) = sets.get(i + 1) {
                for term in &current.vocative {
                    if next.bare.contains(term) {
                        bump(&mut self.voc_then_bare, term);
                    } else if next.determined.contains(term) {
                        bump(&mut self.voc_then_det, term);
                    } else if next.vocative.contains(term) {
                        bump(&mut self.voc_then_voc, term);
                    } else {
                        bump(&mut self.voc_then_none, term);
                    }
                }
            }
        }
    }

    fn get(map: &HashMap<String, u64>, term: &str) -> u64 {
        map.get(term).copied().unwrap_or(0)
    }

    fn row_for(&self, terms: &[&str]) -> AdjacencyRow {
        let sum = |map: &HashMap<String, u64>| terms.iter().map(|t| Self::get(map, t)).sum();
        let vocative_utterances: u64 = sum(&self.voc_total);
        let voc_followed_by_bare_arg: u64 = sum(&self.voc_then_bare);
        let bare_arg_utterances: u64 = sum(&self.bare_total);
        let bare_preceded_by_voc: u64 = sum(&self.bare_preceded_by_voc);
        AdjacencyRow {
            vocative_utterances,
            voc_followed_by_bare_arg,
            voc_followed_by_det_arg: sum(&self.voc_then_det),
            voc_followed_by_voc: sum(&self.voc_then_voc),
            voc_followed_by_absent: sum(&self.voc_then_none),
            pct_voc_then_bare: round1(percent(voc_followed_by_bare_arg, vocative_utterances)),
            bare_arg_utterances,
            bare_preceded_by_voc,
            pct_bare_after_voc: round1(percent(bare_preceded_by_voc, bare_arg_utterances)),
        }
    }

    /// Per-term rows for terms with at least `min_voc` vocative
    /// utterances, plus PARENT and GRANDPARENT category aggregates.
    pub fn summarize(&self, lexicon: &Lexicon, min_voc: u64) -> BTreeMap<String, AdjacencyRow> {
        let mut summary = BTreeMap::new();
        for term in lexicon.term_order() {
            if Self::get(&self.voc_total, term) < min_voc {
                continue;
            }
            summary.insert(term.clone(), self.row_for(&[term.as_str()]));
        }

        for (name, category) in [("PARENT", Category::Parent), ("GRANDPARENT", Category::Grandparent)]
        {
            let members: Vec<&str> = lexicon
                .term_order()
                .iter()
                .filter(|t| lexicon.category(t) == Some(category))
                .map(|t| t.as_str())
                .collect();
            summary.insert(name.to_string(), self.row_for(&members));
        }
        summary
    }
}

/// One summary row of the adjacency report.
#[derive(Debug, Clone, Serialize)]
pub struct AdjacencyRow {
    pub vocative_utterances: u64,
    pub voc_followed_by_bare_arg: u64,
    pub voc_followed_by_det_arg: u64,
    pub voc_followed_by_voc: u64,
    pub voc_followed_by_absent: u64,
    pub pct_voc_then_bare: f64,
    pub bare_arg_utterances: u64,
    pub bare_preceded_by_voc: u64,
    pub pct_bare_after_voc: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
