use std::collections::HashMap;

use crate::lexicon::Lexicon;
use crate::models::{Label, Occurrence};

/// Per-term running totals over a classified corpus.
///
/// All updates are commutative and associative, so per-file tables can be
/// computed independently and merged.
#[derive(Debug, Clone, Default)]
pub struct CountTable {
    /// Non-noise surface word tokens seen; the per-million denominator.
    pub surface_total: u64,
    voc: HashMap<String, u64>,
    voc_chi: HashMap<String, u64>,
    voc_adu: HashMap<String, u64>,
    arg: HashMap<String, u64>,
    arg_bare: HashMap<String, u64>,
    arg_det: HashMap<String, u64>,
    title_name_excluded: HashMap<String, u64>,
}

/// One output row of the per-term table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
    pub term: String,
    pub voc: u64,
    pub voc_chi: u64,
    pub voc_adu: u64,
    pub arg: u64,
    pub arg_bare: u64,
    pub arg_det: u64,
}

fn bump(map: &mut HashMap<String, u64>, term: &str) {
    *map.entry(term.to_string()).or_insert(0) += 1;
}

impl CountTable {
    pub fn record(&mut self, occ: &Occurrence, is_child: bool) {
        match occ.label {
            Label::Vocative => {
                bump(&mut self.voc, &occ.term);
                if is_child {
                    bump(&mut self.voc_chi, &occ.term);
                } else {
                    bump(&mut self.voc_adu, &occ.term);
                }
            }
            Label::BareArgument => {
                bump(&mut self.arg, &occ.term);
                bump(&mut self.arg_bare, &occ.term);
            }
            Label::DeterminedArgument => {
                bump(&mut self.arg, &occ.term);
                bump(&mut self.arg_det, &occ.term);
                if occ.title_name {
                    bump(&mut self.title_name_excluded, &occ.term);
                }
            }
        }
    }

    pub fn add_surface_words(&mut self, n: u64) {
        self.surface_total += n;
    }

    pub fn merge(&mut self, other: CountTable) {
        self.surface_total += other.surface_total;
        for (dst, src) in [
            (&mut self.voc, other.voc),
            (&mut self.voc_chi, other.voc_chi),
            (&mut self.voc_adu, other.voc_adu),
            (&mut self.arg, other.arg),
            (&mut self.arg_bare, other.arg_bare),
            (&mut self.arg_det, other.arg_det),
            (&mut self.title_name_excluded, other.title_name_excluded),
        ] {
            for (term, count) in src {
                *dst.entry(term).or_insert(0) += count;
            }
        }
    }

    pub fn voc(&self, term: &str) -> u64 {
        self.voc.get(term).copied().unwrap_or(0)
    }

    pub fn arg(&self, term: &str) -> u64 {
        self.arg.get(term).copied().unwrap_or(0)
    }

    pub fn row(&self, term: &str) -> CountRow {
        let get = |map: &HashMap<String, u64>| map.get(term).copied().unwrap_or(0);
        CountRow {
            term: term.to_string(),
            voc: get(&self.voc),
            voc_chi: get(&self.voc_chi),
            voc_adu: get(&self.voc_adu),
            arg: get(&self.arg),
            arg_bare: get(&self.arg_bare),
            arg_det: get(&self.arg_det),
        }
    }

    /// Rows for every registered term, in lexicon order.
    pub fn rows(&self, lexicon: &Lexicon) -> Vec<CountRow> {
        lexicon.term_order().iter().map(|t| self.row(t)).collect()
    }

    /// Title+name cases moved out of the bare bucket, most frequent first.
    pub fn title_name_exclusions(&self) -> Vec<(String, u64)> {
        let mut excluded: Vec<(String, u64)> = self
            .title_name_excluded
            .iter()
            .map(|(term, count)| (term.clone(), *count))
            .collect();
        excluded.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        excluded
    }

    /// Corpus-wide vocative and argument totals.
    pub fn totals(&self) -> (u64, u64) {
        (self.voc.values().sum(), self.arg.values().sum())
    }
}

/// Occurrences per million surface words; zero when the corpus is empty.
pub fn per_million(count: u64, surface_total: u64) -> f64 {
    if surface_total == 0 {
        return 0.0;
    }
    count as f64 / surface_total as f64 * 1_000_000.0
}

/// Share of `part` in `total` as a percentage; zero on an empty total.
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn occ(term: &str, label: Label, title_name: bool) -> Occurrence {
        Occurrence {
            term: term.to_string(),
            label,
            category: Category::Parent,
            start_token: 0,
            end_token: 0,
            title_name,
        }
    }

    #[test]
    fn test_record_partitions_labels() {
        let mut table = CountTable::default();
        table.record(&occ("mom", Label::Vocative, false), true);
        table.record(&occ("mom", Label::Vocative, false), false);
        table.record(&occ("mom", Label::BareArgument, false), false);
        table.record(&occ("mom", Label::DeterminedArgument, false), false);

        let row = table.row("mom");
        assert_eq!(row.voc, 2);
        assert_eq!(row.voc_chi, 1);
        assert_eq!(row.voc_adu, 1);
        assert_eq!(row.arg, 2);
        assert_eq!(row.arg_bare, 1);
        assert_eq!(row.arg_det, 1);
        // labels partition: vocative + argument = all occurrences
        assert_eq!(row.voc + row.arg, 4);
    }

    #[test]
    fn test_title_name_exclusions_sorted() {
        let mut table = CountTable::default();
        table.record(&occ("auntie", Label::DeterminedArgument, true), false);
        table.record(&occ("auntie", Label::DeterminedArgument, true), false);
        table.record(&occ("uncle", Label::DeterminedArgument, true), false);
        assert_eq!(
            table.title_name_exclusions(),
            vec![("auntie".to_string(), 2), ("uncle".to_string(), 1)]
        );
    }

    #[test]
    fn test_merge_is_additive() {
        let mut a = CountTable::default();
        a.add_surface_words(10);
        a.record(&occ("mom", Label::Vocative, false), true);

        let mut b = CountTable::default();
        b.add_surface_words(5);
        b.record(&occ("mom", Label::BareArgument, false), false);
        b.record(&occ("dad", Label::Vocative, false), false);

        a.merge(b);
        assert_eq!(a.surface_total, 15);
        assert_eq!(a.row("mom").voc, 1);
        assert_eq!(a.row("mom").arg_bare, 1);
        assert_eq!(a.row("dad").voc, 1);
        assert_eq!(a.totals(), (2, 1));
    }

    #[test]
    fn test_per_million_zero_denominator() {
        assert_eq!(per_million(5, 0), 0.0);
        assert!((per_million(2, 1_000_000) - 2.0).abs() < 1e-9);
        assert_eq!(percent(1, 0), 0.0);
        assert!((percent(1, 4) - 25.0).abs() < 1e-9);
    }
}
