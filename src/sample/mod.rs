pub mod reservoir;

pub use reservoir::*;

use std::collections::BTreeMap;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::classify::Classifier;
use crate::corpus::{CorpusWalker, WalkStats};
use crate::models::{Occurrence, Utterance};

/// One occurrence drawn for manual review.
#[derive(Debug, Clone, Serialize)]
pub struct SampleRecord {
    pub stratum: String,
    pub term: String,
    pub class: String,
    pub category: String,
    pub file: String,
    pub line_no: usize,
    pub speaker: String,
    pub utterance: String,
    /// Utterance tokens with the matched span marked `[[...]]`.
    pub tokens_marked: String,
}

/// Stratified QC sample plus how many occurrences each stratum saw.
#[derive(Debug, Clone)]
pub struct StratifiedSample {
    pub records: BTreeMap<String, Vec<SampleRecord>>,
    pub seen: BTreeMap<String, u64>,
    pub stats: WalkStats,
}

/// QC strata: audited category (parent/extended) crossed with the coarse
/// vocative/argument label.
fn stratum_key(occ: &Occurrence) -> String {
    let class = if occ.label.is_vocative() { "voc" } else { "arg" };
    format!("{}_{}", occ.category.audit_stratum(), class)
}

fn mark_tokens(utt: &Utterance, start: usize, end: usize) -> String {
    utt.tokens
        .iter()
        .enumerate()
        .map(|(i, tok)| {
            if i >= start && i <= end {
                format!("[[{}]]", tok.raw)
            } else {
                tok.raw.clone()
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn record_for(occ: &Occurrence, utt: &Utterance) -> SampleRecord {
    SampleRecord {
        stratum: stratum_key(occ),
        term: occ.term.clone(),
        class: occ.label.coarse_str().to_string(),
        category: occ.category.audit_stratum().to_string(),
        file: utt.file.display().to_string(),
        line_no: utt.line_no,
        speaker: utt.speaker.clone(),
        utterance: utt.text.clone(),
        tokens_marked: mark_tokens(utt, occ.start_token, occ.end_token),
    }
}

/// Stratum keys in the order the QC sheet lists them.
pub const STRATA: [&str; 4] = ["parent_voc", "parent_arg", "extended_voc", "extended_arg"];

/// Draw a fixed-size stratified reservoir sample of classified
/// occurrences for manual QC, without holding the occurrence stream in
/// memory. Deterministic for a fixed seed over the stably ordered corpus.
pub fn sample_corpus(
    root: &Path,
    classifier: &Classifier,
    per_stratum: usize,
    seed: u64,
) -> StratifiedSample {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut reservoirs: BTreeMap<String, Reservoir<SampleRecord>> = STRATA
        .iter()
        .map(|key| (key.to_string(), Reservoir::new(per_stratum)))
        .collect();

    let mut walker = CorpusWalker::new(root);
    for utt in walker.by_ref() {
        for occ in classifier.classify(&utt) {
            let key = stratum_key(&occ);
            if let Some(reservoir) = reservoirs.get_mut(&key) {
                reservoir.offer(record_for(&occ, &utt), &mut rng);
            }
        }
    }

    let mut records = BTreeMap::new();
    let mut seen = BTreeMap::new();
    for (key, reservoir) in reservoirs {
        seen.insert(key.clone(), reservoir.seen());
        records.insert(key, reservoir.into_items());
    }
    StratifiedSample {
        records,
        seen,
        stats: walker.stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Heuristic;
    use crate::lexicon::Lexicon;
    use std::io::Write;

    fn classifier() -> Classifier {
        Classifier::new(Lexicon::english(), Heuristic::Default)
    }

    #[test]
    fn test_sample_partitions_strata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.cha");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "*CHI:\tMommy !\n*MOT:\tI saw mom .\n*CHI:\thi auntie !\n*MOT:\tI saw auntie today .\n"
        )
        .unwrap();

        let sample = sample_corpus(dir.path(), &classifier(), 10, 20260131);

        assert_eq!(sample.records.get("parent_voc").unwrap().len(), 1);
        assert_eq!(sample.records.get("parent_arg").unwrap().len(), 1);
        assert_eq!(sample.records.get("extended_voc").unwrap().len(), 1);
        assert_eq!(sample.records.get("extended_arg").unwrap().len(), 1);

        let voc = &sample.records.get("parent_voc").unwrap()[0];
        assert_eq!(voc.term, "mommy");
        assert_eq!(voc.class, "vocative");
        assert_eq!(voc.speaker, "CHI");
        assert_eq!(voc.tokens_marked, "[[Mommy]] !");
    }

    #[test]
    fn test_sample_under_capacity_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::new();
        for _ in 0..5 {
            content.push_str("*MOT:\tI saw mom .\n");
        }
        std::fs::write(dir.path().join("a.cha"), content).unwrap();

        let sample = sample_corpus(dir.path(), &classifier(), 5, 1);
        assert_eq!(sample.records.get("parent_arg").unwrap().len(), 5);
        assert_eq!(sample.seen.get("parent_arg"), Some(&5));
    }

    #[test]
    fn test_sample_deterministic_for_seed() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::new();
        for i in 0..50 {
            content.push_str(&format!("*MOT:\tI saw mom at {} o'clock .\n", i));
        }
        std::fs::write(dir.path().join("a.cha"), content).unwrap();

        let a = sample_corpus(dir.path(), &classifier(), 5, 42);
        let b = sample_corpus(dir.path(), &classifier(), 5, 42);
        let ua: Vec<&String> = a.records["parent_arg"].iter().map(|r| &r.utterance).collect();
        let ub: Vec<&String> = b.records["parent_arg"].iter().map(|r| &r.utterance).collect();
        assert_eq!(ua, ub);
        assert_eq!(a.seen.get("parent_arg"), Some(&50));
        assert_eq!(a.records["parent_arg"].len(), 5);
    }
}
