//! Per-game grading
//!
//! A grade rewards margin of victory and punishes margin of defeat, scaled by
//! how far apart the two teams' calculation tiers sit. The scaling is
//! asymmetric: a loss to a weaker tier is amplified much harder than a win
//! over a weaker tier is discounted.

use crate::config::RatingConfig;
use crate::types::{Outcome, Tier};
use serde::{Deserialize, Serialize};

/// Everything the grader needs to know about one game from one side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameContext {
    /// Own score minus opponent score
    pub margin: i32,
    pub is_home: bool,
    pub own_tier: Tier,
    pub opponent_tier: Tier,
}

impl GameContext {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_margin(self.margin)
    }

    /// Positive when the opponent sits in a weaker tier
    pub fn tier_diff(&self) -> i32 {
        self.own_tier.diff_to(self.opponent_tier)
    }
}

/// Signed grade for one game plus the factors that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameGrade {
    pub grade: f64,
    pub perf_ratio: f64,
    pub tier_multiplier: f64,
    pub location_multiplier: f64,
}

/// Trait for grading a single game and baselining a team's average
#[cfg_attr(test, mockall::automock)]
pub trait GameGrader: Send + Sync {
    /// Grade one game from one team's perspective
    fn grade(&self, game: &GameContext) -> GameGrade;

    /// Baseline added to the average grade for a team of `tier`
    fn tier_penalty(&self, tier: Tier) -> f64;
}

/// `50 + clamp(margin, ±cap) * 50 / cap`: +cap maps to 100, 0 to 50, -cap to 0
pub fn perf_ratio(margin: i32, margin_cap: f64) -> f64 {
    let capped = (margin as f64).clamp(-margin_cap, margin_cap);
    50.0 + capped * (50.0 / margin_cap)
}

/// Opponent-tier multiplier, asymmetric by outcome
pub fn tier_multiplier(config: &RatingConfig, margin: i32, tier_diff: i32) -> f64 {
    let distance = tier_diff.unsigned_abs() as f64;
    if margin > 0 {
        match tier_diff.signum() {
            -1 => 1.0 + distance * config.upset_win_bonus,
            1 => (1.0 - distance * config.expected_win_discount).max(config.expected_win_floor),
            _ => 1.0,
        }
    } else {
        match tier_diff.signum() {
            1 => 1.0 + distance * config.bad_loss_penalty,
            -1 => (1.0 - distance * config.quality_loss_relief).max(config.quality_loss_floor),
            _ => 1.0,
        }
    }
}

/// Road wins earn a bonus; everything else is neutral
pub fn location_multiplier(config: &RatingConfig, is_home: bool, margin: i32) -> f64 {
    if !is_home && margin > 0 {
        config.road_win_multiplier
    } else {
        1.0
    }
}

/// Default grader driven entirely by a [`RatingConfig`]
#[derive(Debug, Clone)]
pub struct TieredGrader {
    config: RatingConfig,
}

impl TieredGrader {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }
}

impl Default for TieredGrader {
    fn default() -> Self {
        Self::new(RatingConfig::default())
    }
}

impl GameGrader for TieredGrader {
    fn grade(&self, game: &GameContext) -> GameGrade {
        let perf = perf_ratio(game.margin, self.config.margin_cap);
        let tier_mult = tier_multiplier(&self.config, game.margin, game.tier_diff());
        let loc_mult = location_multiplier(&self.config, game.is_home, game.margin);

        // ties grade like wins
        let grade = if game.margin >= 0 {
            perf * tier_mult * loc_mult
        } else {
            -(100.0 - perf) * tier_mult
        };

        GameGrade {
            grade,
            perf_ratio: perf,
            tier_multiplier: tier_mult,
            location_multiplier: loc_mult,
        }
    }

    fn tier_penalty(&self, tier: Tier) -> f64 {
        self.config.tier_penalty(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    fn context(margin: i32, is_home: bool, own: u8, opponent: u8) -> GameContext {
        GameContext {
            margin,
            is_home,
            own_tier: tier(own),
            opponent_tier: tier(opponent),
        }
    }

    #[test]
    fn test_perf_ratio_endpoints() {
        assert_eq!(perf_ratio(28, 28.0), 100.0);
        assert_eq!(perf_ratio(0, 28.0), 50.0);
        assert_eq!(perf_ratio(-28, 28.0), 0.0);
        assert_eq!(perf_ratio(70, 28.0), 100.0);
        assert_eq!(perf_ratio(-70, 28.0), 0.0);
    }

    #[test]
    fn test_tier_multiplier_wins() {
        let config = RatingConfig::default();
        // upset: own tier 3 beats tier 1
        assert!((tier_multiplier(&config, 7, -2) - 1.6).abs() < 1e-9);
        // expected: tier 1 beats tier 4
        assert!((tier_multiplier(&config, 7, 3) - 0.64).abs() < 1e-9);
        // floor
        assert!((tier_multiplier(&config, 7, 7) - 0.16).abs() < 1e-9);
        assert_eq!(tier_multiplier(&config, 7, 0), 1.0);
    }

    #[test]
    fn test_tier_multiplier_non_wins() {
        let config = RatingConfig::default();
        // bad loss: opponent two tiers weaker
        assert_eq!(tier_multiplier(&config, -3, 2), 2.0);
        // quality loss: opponent three tiers stronger
        assert!((tier_multiplier(&config, -3, -3) - 0.7).abs() < 1e-9);
        assert_eq!(tier_multiplier(&config, -3, -7), 0.5);
        // ties use the non-win branch
        assert_eq!(tier_multiplier(&config, 0, 1), 1.5);
    }

    #[test]
    fn test_location_multiplier_only_for_road_wins() {
        let config = RatingConfig::default();
        assert_eq!(location_multiplier(&config, false, 3), 1.1);
        assert_eq!(location_multiplier(&config, true, 3), 1.0);
        assert_eq!(location_multiplier(&config, false, 0), 1.0);
        assert_eq!(location_multiplier(&config, false, -3), 1.0);
    }

    #[test]
    fn test_home_win_same_tier() {
        let grader = TieredGrader::default();
        let graded = grader.grade(&context(20, true, 2, 2));
        assert!((graded.grade - 85.714_285).abs() < 1e-4);
        assert_eq!(graded.tier_multiplier, 1.0);
        assert_eq!(graded.location_multiplier, 1.0);
    }

    #[test]
    fn test_loss_is_negative_shortfall() {
        let grader = TieredGrader::default();
        let graded = grader.grade(&context(-14, true, 1, 1));
        assert!((graded.grade + 75.0).abs() < 1e-9);

        // same loss to a team two tiers weaker doubles the damage
        let bad = grader.grade(&context(-14, true, 1, 3));
        assert!((bad.grade + 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_road_win_and_tie_grades() {
        let grader = TieredGrader::default();
        let road = grader.grade(&context(28, false, 4, 4));
        assert!((road.grade - 110.0).abs() < 1e-9);

        let tie = grader.grade(&context(0, false, 4, 4));
        assert_eq!(tie.grade, 50.0);
        assert_eq!(tie.location_multiplier, 1.0);
    }

    #[test]
    fn test_tier_penalty_from_config() {
        let grader = TieredGrader::default();
        assert_eq!(grader.tier_penalty(tier(1)), 0.0);
        assert_eq!(grader.tier_penalty(tier(2)), -15.0);
    }
}
