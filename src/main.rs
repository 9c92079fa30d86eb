use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use kinvoc::io::{
    write_count_table, write_draws_tsv, write_json, write_sample_tsv, write_sensitivity_tsv,
};
use kinvoc::stats::{
    AdjacencyCounts, AmbiguousPolicy, BetaPrior, ConfusionCounts, CountTable, ObservedVocArg,
    UncertaintyReport, UncertaintySettings, aggregate_observed, confusion_from_labels,
    correlation, sensitivity, simulate_corrections,
};
use kinvoc::{
    Classifier, ConfigError, CorpusWalker, Heuristic, Lexicon, load_manual_labels,
    load_observed_counts, read_transcript, sample_corpus, transcript_files,
};

#[derive(Parser)]
#[command(name = "kinvoc")]
#[command(author, version, about = "Kinship-term vocative/argument analysis for CHILDES Eng-NA", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-term vocative/argument counts with per-million rates
    Count {
        /// Path to the Eng-NA corpus root
        #[arg(long)]
        root: PathBuf,

        /// Output TSV file path
        #[arg(long)]
        out: PathBuf,

        /// Vocative heuristic: strict, default, or loose
        #[arg(long, default_value = "default")]
        heuristic: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Count vocative→argument transitions across adjacent utterances
    Adjacency {
        /// Path to the Eng-NA corpus root
        #[arg(long)]
        root: PathBuf,

        /// Output JSON file path
        #[arg(long)]
        out: PathBuf,

        /// Minimum vocative utterances for a per-term summary row
        #[arg(long, default_value = "20")]
        min_voc: u64,

        /// Vocative heuristic: strict, default, or loose
        #[arg(long, default_value = "default")]
        heuristic: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Draw a stratified reservoir sample for manual QC
    Sample {
        /// Path to the Eng-NA corpus root
        #[arg(long)]
        root: PathBuf,

        /// Output TSV file path
        #[arg(long)]
        out: PathBuf,

        /// Random seed for sampling
        #[arg(long, default_value = "20260131")]
        seed: u64,

        /// Samples per stratum
        #[arg(long, default_value = "50")]
        n_per_stratum: usize,

        /// Vocative heuristic: strict, default, or loose
        #[arg(long, default_value = "default")]
        heuristic: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Propagate manual-QC confusion uncertainty into vocative rates
    Uncertainty {
        /// TSV with observed vocative/argument counts (from `count`)
        #[arg(long)]
        observed: PathBuf,

        /// Output JSON path
        #[arg(long)]
        out: PathBuf,

        /// Posterior draws
        #[arg(long, default_value = "20000")]
        draws: usize,

        /// Random seed
        #[arg(long, default_value = "20260131")]
        seed: u64,

        /// Beta prior a,b for PPV/FOV
        #[arg(long, default_value = "1,1")]
        prior: String,

        /// tp,fp,fn,tn for the parent category
        #[arg(long)]
        confusion_parent: Option<String>,

        /// tp,fp,fn,tn for the extended category
        #[arg(long)]
        confusion_extended: Option<String>,

        /// Manual-labels TSV to derive confusion counts from
        #[arg(long)]
        labels: Option<PathBuf>,

        /// Predicted-label column in the labels file
        #[arg(long, default_value = "class")]
        pred_col: String,

        /// Manual-label column in the labels file
        #[arg(long, default_value = "manual_label")]
        true_col: String,

        /// Category column in the labels file
        #[arg(long, default_value = "category")]
        cat_col: String,

        /// How to handle ambiguous manual labels: drop, voc, or arg
        #[arg(long, default_value = "drop")]
        ambiguous: String,

        /// Optional TSV with per-draw posterior rates
        #[arg(long)]
        samples_out: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Correlate vocative % with bare-argument % across terms
    Correlate {
        /// TSV with observed counts (from `count`)
        #[arg(long)]
        input: PathBuf,

        /// Output JSON path
        #[arg(long)]
        out: PathBuf,

        /// Minimum argument count per term
        #[arg(long, default_value = "50")]
        min_arg: u64,

        /// Bootstrap draws
        #[arg(long, default_value = "10000")]
        draws: usize,

        /// Random seed for the bootstrap
        #[arg(long, default_value = "20260209")]
        seed: u64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compare vocative rates across heuristic strictness variants
    Sensitivity {
        /// Path to the Eng-NA corpus root
        #[arg(long)]
        root: PathBuf,

        /// Output TSV file path
        #[arg(long)]
        out: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Count {
            root,
            out,
            heuristic,
            verbose,
        } => {
            setup_logging(verbose);
            run_count(root, out, heuristic)
        }
        Commands::Adjacency {
            root,
            out,
            min_voc,
            heuristic,
            verbose,
        } => {
            setup_logging(verbose);
            run_adjacency(root, out, min_voc, heuristic)
        }
        Commands::Sample {
            root,
            out,
            seed,
            n_per_stratum,
            heuristic,
            verbose,
        } => {
            setup_logging(verbose);
            run_sample(root, out, seed, n_per_stratum, heuristic)
        }
        Commands::Uncertainty {
            observed,
            out,
            draws,
            seed,
            prior,
            confusion_parent,
            confusion_extended,
            labels,
            pred_col,
            true_col,
            cat_col,
            ambiguous,
            samples_out,
            verbose,
        } => {
            setup_logging(verbose);
            run_uncertainty(UncertaintyArgs {
                observed,
                out,
                draws,
                seed,
                prior,
                confusion_parent,
                confusion_extended,
                labels,
                pred_col,
                true_col,
                cat_col,
                ambiguous,
                samples_out,
            })
        }
        Commands::Correlate {
            input,
            out,
            min_arg,
            draws,
            seed,
            verbose,
        } => {
            setup_logging(verbose);
            run_correlate(input, out, min_arg, draws, seed)
        }
        Commands::Sensitivity { root, out, verbose } => {
            setup_logging(verbose);
            run_sensitivity(root, out)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn run_count(root: PathBuf, out: PathBuf, heuristic: String) -> Result<()> {
    let heuristic: Heuristic = heuristic.parse()?;
    let lexicon = Lexicon::english();
    let classifier = Classifier::new(lexicon.clone(), heuristic);

    info!("Counting kinship occurrences under {:?}", root);
    let mut table = CountTable::default();
    let mut walker = CorpusWalker::new(&root);
    for utt in walker.by_ref() {
        table.add_surface_words(utt.surface_word_count());
        let is_child = utt.is_child();
        for occ in classifier.classify(&utt) {
            table.record(&occ, is_child);
        }
    }

    write_count_table(&out, &table, &lexicon)?;

    let (voc, arg) = table.totals();
    info!(
        "Counted {} vocative and {} argument occurrences over {} surface words",
        voc, arg, table.surface_total
    );
    let exclusions = table.title_name_exclusions();
    if !exclusions.is_empty() {
        info!("Title+name cases excluded from bare-argument counts:");
        for (term, count) in exclusions {
            info!("  {}: {}", term, count);
        }
    }
    report_stats(&walker.stats);
    info!("Output written to {:?}", out);
    Ok(())
}

fn run_adjacency(root: PathBuf, out: PathBuf, min_voc: u64, heuristic: String) -> Result<()> {
    let heuristic: Heuristic = heuristic.parse()?;
    let lexicon = Lexicon::english();
    let classifier = Classifier::new(lexicon.clone(), heuristic);

    info!("Analyzing vocative/argument adjacency under {:?}", root);
    let mut counts = AdjacencyCounts::default();
    let mut stats = kinvoc::WalkStats::default();
    for path in transcript_files(&root) {
        let Some(utterances) = read_transcript(&path, &root, &mut stats) else {
            continue;
        };
        counts.record_transcript(&classifier, &utterances);
    }

    let summary = counts.summarize(&lexicon, min_voc);
    write_json(&out, &summary)?;

    info!("Summarized {} terms/categories", summary.len());
    report_stats(&stats);
    info!("Output written to {:?}", out);
    Ok(())
}

fn run_sample(
    root: PathBuf,
    out: PathBuf,
    seed: u64,
    n_per_stratum: usize,
    heuristic: String,
) -> Result<()> {
    let heuristic: Heuristic = heuristic.parse()?;
    let classifier = Classifier::new(Lexicon::english(), heuristic);

    info!("Sampling occurrences for manual QC under {:?}", root);
    let sample = sample_corpus(&root, &classifier, n_per_stratum, seed);
    write_sample_tsv(&out, &sample)?;

    info!("Occurrences seen per stratum:");
    for (stratum, seen) in &sample.seen {
        info!("  {}: {}", stratum, seen);
    }
    report_stats(&sample.stats);
    info!("Output written to {:?}", out);
    Ok(())
}

struct UncertaintyArgs {
    observed: PathBuf,
    out: PathBuf,
    draws: usize,
    seed: u64,
    prior: String,
    confusion_parent: Option<String>,
    confusion_extended: Option<String>,
    labels: Option<PathBuf>,
    pred_col: String,
    true_col: String,
    cat_col: String,
    ambiguous: String,
    samples_out: Option<PathBuf>,
}

fn run_uncertainty(args: UncertaintyArgs) -> Result<()> {
    let prior: BetaPrior = args.prior.parse()?;
    let ambiguous: AmbiguousPolicy = args.ambiguous.parse()?;
    let lexicon = Lexicon::english();

    let observed_rows = load_observed_counts(&args.observed, &lexicon)?;
    let observed_by_cat: BTreeMap<String, ObservedVocArg> =
        aggregate_observed(&observed_rows, &lexicon);

    let confusion: BTreeMap<String, ConfusionCounts> = if let Some(labels_path) = &args.labels {
        let records =
            load_manual_labels(labels_path, &args.pred_col, &args.true_col, &args.cat_col)?;
        confusion_from_labels(&records, ambiguous)
    } else {
        let (Some(parent), Some(extended)) = (&args.confusion_parent, &args.confusion_extended)
        else {
            return Err(ConfigError::MissingConfusion.into());
        };
        let mut map = BTreeMap::new();
        map.insert("parent".to_string(), parent.parse::<ConfusionCounts>()?);
        map.insert("extended".to_string(), extended.parse::<ConfusionCounts>()?);
        map
    };

    info!("Simulating {} posterior draws", args.draws);
    let result = simulate_corrections(&confusion, &observed_by_cat, args.draws, prior, args.seed)?;

    if let Some(samples_out) = &args.samples_out {
        write_draws_tsv(samples_out, &result)?;
        info!("Posterior draws written to {:?}", samples_out);
    }

    for (category, posterior) in &result.categories {
        let s = posterior.true_voc_rate_summary;
        info!(
            "{}: corrected vocative rate {:.4} [{:.4}, {:.4}]",
            category, s.mean, s.q025, s.q975
        );
    }

    let report = UncertaintyReport {
        settings: UncertaintySettings {
            draws: args.draws,
            seed: args.seed,
            prior,
        },
        observed_counts: observed_by_cat,
        confusion_counts: confusion,
        posterior_summary: result,
    };
    write_json(&args.out, &report)?;
    info!("Output written to {:?}", args.out);
    Ok(())
}

fn run_correlate(input: PathBuf, out: PathBuf, min_arg: u64, draws: usize, seed: u64) -> Result<()> {
    let lexicon = Lexicon::english();
    let observed = load_observed_counts(&input, &lexicon)?;
    let summary = correlation::analyze(&observed, &lexicon, min_arg, draws, seed);

    if let Some(estimate) = &summary.estimate {
        info!(
            "Spearman rho = {:.2} [{:.2}, {:.2}] (n={})",
            estimate.rho, estimate.ci_lo, estimate.ci_hi, estimate.n
        );
    } else {
        info!("Too few terms passed the min-arg filter to estimate rho");
    }
    if let Some(clusters) = &summary.robustness.family_clusters {
        info!(
            "Family clusters: rho = {:.2} [{:.2}, {:.2}] (n={})",
            clusters.rho, clusters.ci_lo, clusters.ci_hi, clusters.n
        );
    }

    write_json(&out, &summary)?;
    info!("Output written to {:?}", out);
    Ok(())
}

fn run_sensitivity(root: PathBuf, out: PathBuf) -> Result<()> {
    let lexicon = Lexicon::english();
    info!("Re-classifying corpus under all heuristic variants");
    let result = sensitivity::run(&root, &lexicon);
    write_sensitivity_tsv(&out, &result.rows)?;

    for heuristic in ["strict", "default", "loose"] {
        if let Some(row) = result
            .rows
            .iter()
            .find(|r| r.heuristic == heuristic && r.label == "all")
        {
            info!(
                "{}: {} vocative / {} argument ({:.2}% vocative)",
                heuristic, row.vocative_count, row.argument_count, row.vocative_percent
            );
        }
    }
    report_stats(&result.stats);
    info!("Output written to {:?}", out);
    Ok(())
}

fn report_stats(stats: &kinvoc::WalkStats) {
    info!(
        "Corpus walk: {} files read, {} files skipped, {} lines skipped",
        stats.files_read, stats.files_skipped, stats.lines_skipped
    );
}
