pub mod application;
pub mod availability;
pub mod cache;
pub mod experience;
pub mod filter;
pub mod location;
pub mod pipeline;
pub mod preferences;
pub mod scoring;
pub mod skills;
pub mod top_k;
pub mod weights;

pub use application::ApplicationScorer;
pub use cache::{CandidateMatch, JobMatch, MatchCache, MatchRecord};
pub use filter::{FilterOutcome, HardFilter};
pub use pipeline::{RankOptions, RankingEngine};
pub use scoring::{MatchScore, PairScorer, ScoreAggregator, ScoreBreakdown, ScoringError};
pub use weights::{ConfigError, MatchingConfig, Weights, DEFAULT_WEIGHTS};

/// `round(numerator / denominator * 100)` with halves rounded up, in integers.
/// A zero denominator yields 0; callers handle their own empty cases first.
pub(crate) fn ratio_percent(numerator: usize, denominator: usize) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let numerator = numerator.min(denominator) as u64;
    let denominator = denominator as u64;
    ((numerator * 200 + denominator) / (denominator * 2)) as u8
}

/// Rounds a finite score to the nearest integer in 0..=100.
pub(crate) fn clamp_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
