use thiserror::Error;

/// Configuration-contract failures.
///
/// These abort a run before any corpus work starts; data-level problems
/// (unreadable files, malformed lines) are recovered locally and reported
/// as skip counts instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("confusion counts must be four comma-separated integers (tp,fp,fn,tn), got {0:?}")]
    BadConfusion(String),

    #[error("beta prior must be two comma-separated positive numbers (a,b), got {0:?}")]
    BadPrior(String),

    #[error("provide either a manual-labels file or explicit confusion counts for both parent and extended")]
    MissingConfusion,

    #[error("unknown heuristic {0:?} (expected strict, default, or loose)")]
    UnknownHeuristic(String),

    #[error("unknown ambiguous-label policy {0:?} (expected drop, voc, or arg)")]
    UnknownAmbiguousPolicy(String),
}
