pub mod classify;
pub mod corpus;
pub mod error;
pub mod io;
pub mod lexicon;
pub mod models;
pub mod sample;
pub mod stats;

pub use classify::{Classifier, Heuristic};
pub use corpus::{CorpusWalker, WalkStats, read_transcript, transcript_files};
pub use error::ConfigError;
pub use io::{load_manual_labels, load_observed_counts};
pub use lexicon::Lexicon;
pub use models::{Category, Label, MorEntry, Occurrence, Token, Utterance};
pub use sample::{SampleRecord, StratifiedSample, sample_corpus};
pub use stats::{
    AdjacencyCounts, AmbiguousPolicy, BetaPrior, ConfusionCounts, CountTable, UncertaintyResult,
};
