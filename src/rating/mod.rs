//! Strength-of-record rating and related schedule metrics
//!
//! This module provides per-game grading, the two-pass SOR engine, the
//! tier-thresholded leaderboard and the simpler strength-of-schedule score.

pub mod engine;
pub mod grade;
pub mod leaderboard;
pub mod sos;

// Re-export commonly used types
pub use engine::{GameDetail, SorEngine, SorOutcome, SorRow, CONVERGENCE_PASSES};
pub use grade::{
    location_multiplier, perf_ratio, tier_multiplier, GameContext, GameGrade, GameGrader,
    TieredGrader,
};
pub use leaderboard::{games_threshold, Leaderboard, RankedEntry, TierExtremes, TierThreshold};
pub use sos::{classification_weight, ScheduledOpponent, SosCalculator, SosRank, SosReport};
