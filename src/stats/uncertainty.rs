use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Beta, Distribution};
use serde::Serialize;

use crate::error::ConfigError;

/// Manual-review confusion counts for one audited category.
///
/// "Positive" is the vocative label: `true_pos` = classified vocative and
/// manually vocative, `false_pos` = classified vocative but manually
/// argument, and so on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionCounts {
    pub true_pos: u64,
    pub false_pos: u64,
    pub false_neg: u64,
    pub true_neg: u64,
}

impl FromStr for ConfusionCounts {
    type Err = ConfigError;

    /// Parse the CLI form `tp,fp,fn,tn`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ConfigError::BadConfusion(s.to_string()));
        }
        let mut values = [0u64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| ConfigError::BadConfusion(s.to_string()))?;
        }
        Ok(ConfusionCounts {
            true_pos: values[0],
            false_pos: values[1],
            false_neg: values[2],
            true_neg: values[3],
        })
    }
}

/// Symmetric-capable Beta prior for PPV and FOV posteriors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BetaPrior {
    pub a: f64,
    pub b: f64,
}

impl Default for BetaPrior {
    fn default() -> Self {
        Self { a: 1.0, b: 1.0 }
    }
}

impl FromStr for BetaPrior {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::BadPrior(s.to_string());
        let (a, b) = s.split_once(',').ok_or_else(bad)?;
        let a: f64 = a.trim().parse().map_err(|_| bad())?;
        let b: f64 = b.trim().parse().map_err(|_| bad())?;
        if !(a > 0.0 && b > 0.0) {
            return Err(bad());
        }
        Ok(BetaPrior { a, b })
    }
}

/// How to reconcile "ambiguous" manual labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguousPolicy {
    Drop,
    Vocative,
    Argument,
}

impl FromStr for AmbiguousPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(AmbiguousPolicy::Drop),
            "voc" => Ok(AmbiguousPolicy::Vocative),
            "arg" => Ok(AmbiguousPolicy::Argument),
            other => Err(ConfigError::UnknownAmbiguousPolicy(other.to_string())),
        }
    }
}

/// One manually reviewed record from a labels file.
#[derive(Debug, Clone)]
pub struct LabelRecord {
    pub category: String,
    pub predicted: String,
    pub manual: String,
}

fn normalize_label(value: &str) -> Option<&'static str> {
    let v = value.trim().to_lowercase();
    if matches!(v.as_str(), "ambig" | "ambiguous" | "uncertain") {
        return Some("ambiguous");
    }
    if v.starts_with('v') {
        return Some("vocative");
    }
    if v.starts_with('a') {
        return Some("argument");
    }
    None
}

/// Derive per-category confusion counts from manual labels.
///
/// Only the audited categories (parent, extended) are tallied; rows with
/// unrecognized labels are dropped.
pub fn confusion_from_labels(
    records: &[LabelRecord],
    ambiguous: AmbiguousPolicy,
) -> BTreeMap<String, ConfusionCounts> {
    let mut confusion = BTreeMap::new();
    confusion.insert("parent".to_string(), ConfusionCounts::default());
    confusion.insert("extended".to_string(), ConfusionCounts::default());

    for record in records {
        let category = record.category.trim().to_lowercase();
        let Some(conf) = confusion.get_mut(&category) else {
            continue;
        };
        let Some(pred) = normalize_label(&record.predicted) else {
            continue;
        };
        let Some(mut truth) = normalize_label(&record.manual) else {
            continue;
        };
        if truth == "ambiguous" {
            truth = match ambiguous {
                AmbiguousPolicy::Drop => continue,
                AmbiguousPolicy::Vocative => "vocative",
                AmbiguousPolicy::Argument => "argument",
            };
        }
        if pred == "ambiguous" {
            continue;
        }
        match (pred, truth) {
            ("vocative", "vocative") => conf.true_pos += 1,
            ("vocative", "argument") => conf.false_pos += 1,
            ("argument", "vocative") => conf.false_neg += 1,
            ("argument", "argument") => conf.true_neg += 1,
            _ => {}
        }
    }
    confusion
}

/// Observed corpus totals for one category.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ObservedVocArg {
    pub voc: u64,
    pub arg: u64,
}

/// Aggregate per-term observed counts into category totals, with all
/// three categories always present.
pub fn aggregate_observed(
    observed: &[crate::stats::ObservedCounts],
    lexicon: &crate::lexicon::Lexicon,
) -> BTreeMap<String, ObservedVocArg> {
    let mut by_category: BTreeMap<String, ObservedVocArg> = BTreeMap::new();
    for name in ["parent", "grandparent", "extended"] {
        by_category.insert(name.to_string(), ObservedVocArg::default());
    }
    for row in observed {
        let Some(category) = lexicon.category(&row.term) else {
            continue;
        };
        let entry = by_category.entry(category.as_str().to_string()).or_default();
        entry.voc += row.voc;
        entry.arg += row.arg;
    }
    by_category
}

/// Summary statistics of a posterior sample.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PosteriorSummary {
    pub mean: f64,
    pub median: f64,
    pub q025: f64,
    pub q975: f64,
}

impl PosteriorSummary {
    /// Sorts the samples; `None` on an empty draw set.
    pub fn from_samples(mut samples: Vec<f64>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_by(f64::total_cmp);
        let n = samples.len();
        Some(Self {
            mean: samples.iter().sum::<f64>() / n as f64,
            median: samples[n / 2],
            q025: samples[(0.025 * (n - 1) as f64) as usize],
            q975: samples[(0.975 * (n - 1) as f64) as usize],
        })
    }
}

/// Posterior draws and summaries for one audited category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPosterior {
    pub ppv_summary: PosteriorSummary,
    pub fov_summary: PosteriorSummary,
    pub true_voc_rate_summary: PosteriorSummary,
    #[serde(skip)]
    pub rate_draws: Vec<f64>,
}

/// Parent-vs-extended contrast of corrected vocative rates.
#[derive(Debug, Clone, Serialize)]
pub struct ContrastSummary {
    pub diff_summary: PosteriorSummary,
    pub ratio_summary: PosteriorSummary,
}

/// Full uncertainty-propagation result.
#[derive(Debug, Clone, Serialize)]
pub struct UncertaintyResult {
    pub categories: BTreeMap<String, CategoryPosterior>,
    pub contrast: Option<ContrastSummary>,
}

/// Settings echoed into the JSON report for reproducibility.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UncertaintySettings {
    pub draws: usize,
    pub seed: u64,
    pub prior: BetaPrior,
}

/// The full JSON report of an uncertainty run: inputs alongside
/// posterior summaries (per-draw vectors are not serialized).
#[derive(Debug, Clone, Serialize)]
pub struct UncertaintyReport {
    pub settings: UncertaintySettings,
    pub observed_counts: BTreeMap<String, ObservedVocArg>,
    pub confusion_counts: BTreeMap<String, ConfusionCounts>,
    pub posterior_summary: UncertaintyResult,
}

/// Propagate manual-QC uncertainty into corrected vocative rates.
///
/// For each category, the positive predictive value of the vocative label
/// and the false omission rate of the argument label each get a Beta
/// posterior (`prior` updated by the confusion counts). Every draw
/// reweights the observed totals into an implied true vocative rate:
/// `true_voc = voc * ppv + arg * fov`.
pub fn simulate_corrections(
    confusion: &BTreeMap<String, ConfusionCounts>,
    observed: &BTreeMap<String, ObservedVocArg>,
    draws: usize,
    prior: BetaPrior,
    seed: u64,
) -> Result<UncertaintyResult> {
    let draws = draws.max(1);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut categories = BTreeMap::new();

    for category in ["parent", "extended"] {
        let Some(conf) = confusion.get(category) else {
            continue;
        };
        let counts = observed.get(category).copied().unwrap_or_default();
        let (pred_voc, pred_arg) = (counts.voc, counts.arg);
        let total = pred_voc + pred_arg;

        let ppv_dist = Beta::new(
            prior.a + conf.true_pos as f64,
            prior.b + conf.false_pos as f64,
        )?;
        let fov_dist = Beta::new(
            prior.a + conf.false_neg as f64,
            prior.b + conf.true_neg as f64,
        )?;

        let mut ppv_draws = Vec::with_capacity(draws);
        let mut fov_draws = Vec::with_capacity(draws);
        let mut rate_draws = Vec::with_capacity(draws);
        for _ in 0..draws {
            let ppv: f64 = ppv_dist.sample(&mut rng);
            let fov: f64 = fov_dist.sample(&mut rng);
            let true_voc = pred_voc as f64 * ppv + pred_arg as f64 * fov;
            let rate = if total > 0 {
                true_voc / total as f64
            } else {
                0.0
            };
            ppv_draws.push(ppv);
            fov_draws.push(fov);
            rate_draws.push(rate);
        }

        // draws >= 1, so the summaries always exist
        let (Some(ppv_summary), Some(fov_summary), Some(true_voc_rate_summary)) = (
            PosteriorSummary::from_samples(ppv_draws),
            PosteriorSummary::from_samples(fov_draws),
            PosteriorSummary::from_samples(rate_draws.clone()),
        ) else {
            continue;
        };
        categories.insert(
            category.to_string(),
            CategoryPosterior {
                ppv_summary,
                fov_summary,
                true_voc_rate_summary,
                rate_draws,
            },
        );
    }

    let contrast = match (categories.get("parent"), categories.get("extended")) {
        (Some(parent), Some(extended)) => {
            let diffs: Vec<f64> = parent
                .rate_draws
                .iter()
                .zip(&extended.rate_draws)
                .map(|(p, e)| p - e)
                .collect();
            let ratios: Vec<f64> = parent
                .rate_draws
                .iter()
                .zip(&extended.rate_draws)
                .map(|(p, e)| if *e > 0.0 { p / e } else { f64::INFINITY })
                .collect();
            match (
                PosteriorSummary::from_samples(diffs),
                PosteriorSummary::from_samples(ratios),
            ) {
                (Some(diff_summary), Some(ratio_summary)) => Some(ContrastSummary {
                    diff_summary,
                    ratio_summary,
                }),
                _ => None,
            }
        }
        _ => None,
    };

    Ok(UncertaintyResult {
        categories,
        contrast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(parent: (u64, u64), extended: (u64, u64)) -> BTreeMap<String, ObservedVocArg> {
        let mut map = BTreeMap::new();
        map.insert(
            "parent".to_string(),
            ObservedVocArg {
                voc: parent.0,
                arg: parent.1,
            },
        );
        map.insert(
            "extended".to_string(),
            ObservedVocArg {
                voc: extended.0,
                arg: extended.1,
            },
        );
        map
    }

    fn confusion(parent: &str, extended: &str) -> BTreeMap<String, ConfusionCounts> {
        let mut map = BTreeMap::new();
        map.insert("parent".to_string(), parent.parse().unwrap());
        map.insert("extended".to_string(), extended.parse().unwrap());
        map
    }

    #[test]
    fn test_parse_confusion() {
        let conf: ConfusionCounts = "40, 2, 3, 55".parse().unwrap();
        assert_eq!(conf.true_pos, 40);
        assert_eq!(conf.false_pos, 2);
        assert_eq!(conf.false_neg, 3);
        assert_eq!(conf.true_neg, 55);
        assert!("1,2,3".parse::<ConfusionCounts>().is_err());
        assert!("a,b,c,d".parse::<ConfusionCounts>().is_err());
    }

    #[test]
    fn test_parse_prior() {
        let prior: BetaPrior = "1,1".parse().unwrap();
        assert_eq!(prior, BetaPrior { a: 1.0, b: 1.0 });
        assert!("0,1".parse::<BetaPrior>().is_err());
        assert!("1".parse::<BetaPrior>().is_err());
    }

    #[test]
    fn test_confusion_from_labels_policies() {
        let records = vec![
            LabelRecord {
                category: "parent".into(),
                predicted: "vocative".into(),
                manual: "voc".into(),
            },
            LabelRecord {
                category: "parent".into(),
                predicted: "vocative".into(),
                manual: "argument".into(),
            },
            LabelRecord {
                category: "parent".into(),
                predicted: "argument".into(),
                manual: "ambiguous".into(),
            },
            LabelRecord {
                category: "grandparent".into(), // not audited
                predicted: "vocative".into(),
                manual: "vocative".into(),
            },
        ];

        let dropped = confusion_from_labels(&records, AmbiguousPolicy::Drop);
        let parent = dropped.get("parent").unwrap();
        assert_eq!(parent.true_pos, 1);
        assert_eq!(parent.false_pos, 1);
        assert_eq!(parent.false_neg, 0);
        assert_eq!(parent.true_neg, 0);

        let as_voc = confusion_from_labels(&records, AmbiguousPolicy::Vocative);
        assert_eq!(as_voc.get("parent").unwrap().false_neg, 1);

        let as_arg = confusion_from_labels(&records, AmbiguousPolicy::Argument);
        assert_eq!(as_arg.get("parent").unwrap().true_neg, 1);
    }

    #[test]
    fn test_clean_confusion_recovers_observed_rate() {
        // zero false positives/negatives with a weak prior: the corrected
        // rate collapses onto the raw observed rate
        let conf = confusion("200,0,0,200", "200,0,0,200");
        let obs = observed((300, 700), (100, 900));
        let result =
            simulate_corrections(&conf, &obs, 4000, BetaPrior::default(), 99).unwrap();

        let parent = result.categories.get("parent").unwrap();
        assert!((parent.true_voc_rate_summary.mean - 0.30).abs() < 0.02);
        let extended = result.categories.get("extended").unwrap();
        assert!((extended.true_voc_rate_summary.mean - 0.10).abs() < 0.02);

        let contrast = result.contrast.as_ref().unwrap();
        assert!((contrast.diff_summary.mean - 0.20).abs() < 0.03);
    }

    #[test]
    fn test_simulation_deterministic_under_seed() {
        let conf = confusion("40,2,3,55", "30,5,4,61");
        let obs = observed((500, 1500), (200, 1800));
        let a = simulate_corrections(&conf, &obs, 500, BetaPrior::default(), 7).unwrap();
        let b = simulate_corrections(&conf, &obs, 500, BetaPrior::default(), 7).unwrap();
        let pa = a.categories.get("parent").unwrap();
        let pb = b.categories.get("parent").unwrap();
        assert_eq!(pa.rate_draws, pb.rate_draws);
    }

    #[test]
    fn test_interval_orders() {
        let conf = confusion("40,2,3,55", "30,5,4,61");
        let obs = observed((500, 1500), (200, 1800));
        let result =
            simulate_corrections(&conf, &obs, 2000, BetaPrior::default(), 3).unwrap();
        for posterior in result.categories.values() {
            let s = posterior.true_voc_rate_summary;
            assert!(s.q025 <= s.median && s.median <= s.q975);
            assert!(s.q025 <= s.mean && s.mean <= s.q975);
        }
    }
}
