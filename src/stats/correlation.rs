use std::collections::BTreeMap;

use serde::Serialize;

use crate::lexicon::Lexicon;
use crate::models::Category;
use crate::stats::{bootstrap_spearman, percent, spearman};

/// Observed per-term counts, as loaded from a count table TSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCounts {
    pub term: String,
    pub voc: u64,
    pub arg: u64,
    pub arg_bare: u64,
    pub arg_det: u64,
}

/// One term's derived rates entering the correlation.
#[derive(Debug, Clone, Serialize)]
pub struct TermRates {
    pub term: String,
    pub category: Category,
    pub voc_pct: f64,
    pub bare_pct: f64,
    pub arg: u64,
}

/// Point estimate with percentile bootstrap interval.
#[derive(Debug, Clone, Serialize)]
pub struct RhoEstimate {
    pub rho: f64,
    pub ci_lo: f64,
    pub ci_hi: f64,
    pub n: usize,
}

/// Full correlation report: headline estimate plus robustness checks.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationSummary {
    pub n_terms: usize,
    pub min_arg: u64,
    pub bootstrap_draws: usize,
    pub estimate: Option<RhoEstimate>,
    pub robustness: Robustness,
}

#[derive(Debug, Clone, Serialize)]
pub struct Robustness {
    pub family_clusters: Option<RhoEstimate>,
    pub min_arg_sensitivity: BTreeMap<String, Option<RhoEstimate>>,
}

/// Morphological variants collapsed into family clusters for the
/// robustness check; cluster category follows the first member.
pub const FAMILY_CLUSTERS: &[(&str, &[&str])] = &[
    ("MOM", &["mom", "mommy", "momma", "mama", "ma", "mother"]),
    ("DAD", &["dad", "daddy", "dada", "papa", "pa", "father"]),
    (
        "GRANDMA",
        &[
            "grandma", "granny", "gramma", "nana", "grandmom", "grandmommy", "grandmother",
            "grandmama",
        ],
    ),
    (
        "GRANDPA",
        &[
            "grandpa", "granddad", "granddaddy", "gramps", "grampa", "grandfather", "grandpapa",
        ],
    ),
    ("AUNT", &["aunt", "auntie", "aunty"]),
    ("UNCLE", &["uncle"]),
    ("COUSIN", &["cousin"]),
    ("BROTHER", &["brother"]),
    ("SISTER", &["sister", "sissy"]),
    ("SON", &["son"]),
    ("DAUGHTER", &["daughter"]),
    ("NIECE", &["niece"]),
    ("NEPHEW", &["nephew"]),
];

/// Per-term rates passing the minimum-argument filter.
///
/// Terms below `min_arg` observed arguments, or with no bare/determined
/// split at all, are excluded as too noisy to rank.
pub fn term_rates(observed: &[ObservedCounts], lexicon: &Lexicon, min_arg: u64) -> Vec<TermRates> {
    observed
        .iter()
        .filter_map(|row| {
            let category = lexicon.category(&row.term)?;
            if row.arg < min_arg || row.arg_bare + row.arg_det == 0 {
                return None;
            }
            Some(TermRates {
                term: row.term.clone(),
                category,
                voc_pct: percent(row.voc, row.voc + row.arg),
                bare_pct: percent(row.arg_bare, row.arg_bare + row.arg_det),
                arg: row.arg,
            })
        })
        .collect()
}

/// Collapse morphological variants into family clusters, then apply the
/// same filters as [`term_rates`].
pub fn cluster_rates(observed: &[ObservedCounts], lexicon: &Lexicon, min_arg: u64) -> Vec<TermRates> {
    let by_term: BTreeMap<&str, &ObservedCounts> =
        observed.iter().map(|row| (row.term.as_str(), row)).collect();

    let mut rates = Vec::new();
    for (name, members) in FAMILY_CLUSTERS {
        let mut voc = 0u64;
        let mut arg = 0u64;
        let mut bare = 0u64;
        let mut det = 0u64;
        for member in *members {
            if let Some(row) = by_term.get(member) {
                voc += row.voc;
                arg += row.arg;
                bare += row.arg_bare;
                det += row.arg_det;
            }
        }
        if arg < min_arg || bare + det == 0 {
            continue;
        }
        let Some(category) = lexicon.category(members[0]) else {
            continue;
        };
        rates.push(TermRates {
            term: name.to_string(),
            category,
            voc_pct: percent(voc, voc + arg),
            bare_pct: percent(bare, bare + det),
            arg,
        });
    }
    rates
}

/// Spearman rho of vocative % against bare-argument % with bootstrap CrI.
pub fn rho_with_ci(rates: &[TermRates], draws: usize, seed: u64) -> Option<RhoEstimate> {
    let x: Vec<f64> = rates.iter().map(|r| r.voc_pct).collect();
    let y: Vec<f64> = rates.iter().map(|r| r.bare_pct).collect();
    let rho = spearman(&x, &y)?;
    let (ci_lo, ci_hi) = bootstrap_spearman(&x, &y, draws, seed)?;
    Some(RhoEstimate {
        rho,
        ci_lo,
        ci_hi,
        n: rates.len(),
    })
}

/// Headline estimate plus family-cluster and min-arg robustness checks.
pub fn analyze(
    observed: &[ObservedCounts],
    lexicon: &Lexicon,
    min_arg: u64,
    draws: usize,
    seed: u64,
) -> CorrelationSummary {
    let rates = term_rates(observed, lexicon, min_arg);
    let estimate = rho_with_ci(&rates, draws, seed);

    let clusters = cluster_rates(observed, lexicon, min_arg);
    let family_clusters = rho_with_ci(&clusters, draws, seed);

    let mut min_arg_sensitivity = BTreeMap::new();
    for threshold in [25u64, 50, 100] {
        let trates = term_rates(observed, lexicon, threshold);
        min_arg_sensitivity.insert(threshold.to_string(), rho_with_ci(&trates, draws, seed));
    }

    CorrelationSummary {
        n_terms: rates.len(),
        min_arg,
        bootstrap_draws: draws,
        estimate,
        robustness: Robustness {
            family_clusters,
            min_arg_sensitivity,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(term: &str, voc: u64, arg: u64, bare: u64, det: u64) -> ObservedCounts {
        ObservedCounts {
            term: term.to_string(),
            voc,
            arg,
            arg_bare: bare,
            arg_det: det,
        }
    }

    #[test]
    fn test_term_rates_filters() {
        let lex = Lexicon::english();
        let observed = vec![
            row("mom", 100, 200, 50, 150),
            row("dad", 10, 20, 5, 15), // below min_arg
            row("uncle", 5, 60, 0, 0), // no bare/det split
            row("pizza", 50, 500, 10, 490), // not a kinship term
        ];
        let rates = term_rates(&observed, &lex, 50);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].term, "mom");
        assert!((rates[0].voc_pct - 100.0 / 3.0).abs() < 1e-9);
        assert!((rates[0].bare_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_cluster_rates_collapse_variants() {
        let lex = Lexicon::english();
        let observed = vec![
            row("mom", 40, 30, 10, 20),
            row("mommy", 60, 30, 20, 10),
            row("aunt", 5, 25, 20, 5),
            row("auntie", 5, 30, 25, 5),
        ];
        let rates = cluster_rates(&observed, &lex, 50);
        assert_eq!(rates.len(), 2);
        let mom = rates.iter().find(|r| r.term == "MOM").unwrap();
        assert_eq!(mom.category, Category::Parent);
        assert_eq!(mom.arg, 60);
        assert!((mom.bare_pct - 50.0).abs() < 1e-9);
        let aunt = rates.iter().find(|r| r.term == "AUNT").unwrap();
        assert_eq!(aunt.category, Category::Extended);
        assert_eq!(aunt.arg, 55);
    }

    #[test]
    fn test_analyze_reports_all_thresholds() {
        let lex = Lexicon::english();
        let observed: Vec<ObservedCounts> = lex
            .term_order()
            .iter()
            .enumerate()
            .map(|(i, term)| {
                let i = i as u64;
                row(term, 10 + i * 3, 120, 30 + i, 60)
            })
            .collect();
        let summary = analyze(&observed, &lex, 50, 200, 11);
        assert!(summary.estimate.is_some());
        assert_eq!(summary.robustness.min_arg_sensitivity.len(), 3);
        let est = summary.estimate.unwrap();
        assert!(est.ci_lo <= est.rho && est.rho <= est.ci_hi);
    }
}
