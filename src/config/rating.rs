//! Rating engine configuration
//!
//! Every constant used by the SOR engine and the leaderboard filter lives
//! here so that alternative rule sets can be evaluated side by side.

use crate::error::AnalyticsError;
use crate::types::Tier;
use serde::{Deserialize, Serialize};

/// Starting opponent strength for each tier (pass 0)
pub const STATIC_TIER_WEIGHTS: [f64; Tier::COUNT] = [1.0, 0.8, 0.6, 0.4, 0.3, 0.2, 0.15, 0.05];

/// Baseline added to a team's average grade according to its own tier
pub const STATIC_TIER_PENALTIES: [f64; Tier::COUNT] =
    [0.0, -15.0, -45.0, -65.0, -85.0, -105.0, -125.0, -145.0];

/// Tunable parameters for strength-of-record grading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Opponent strength seed per tier, index 0 = tier 1
    pub tier_weights: [f64; Tier::COUNT],
    /// Score baseline per tier, index 0 = tier 1
    pub tier_penalties: [f64; Tier::COUNT],
    /// Margins are clamped to +/- this many points
    pub margin_cap: f64,
    /// Per-tier bonus for beating a stronger tier
    pub upset_win_bonus: f64,
    /// Per-tier discount for beating a weaker tier
    pub expected_win_discount: f64,
    /// Lowest multiplier an expected win can fall to
    pub expected_win_floor: f64,
    /// Per-tier amplifier for losing to a weaker tier
    pub bad_loss_penalty: f64,
    /// Per-tier relief for losing to a stronger tier
    pub quality_loss_relief: f64,
    /// Lowest multiplier a quality loss can fall to
    pub quality_loss_floor: f64,
    /// Multiplier for winning away from home
    pub road_win_multiplier: f64,
    /// Offset applied to a prior rating before scaling into a strength
    pub strength_offset: f64,
    /// Divisor applied after the offset
    pub strength_scale: f64,
    pub strength_floor: f64,
    pub strength_ceiling: f64,
    /// Share of the tier leader's game count required to be listed
    pub threshold_ratio: f64,
    /// Absolute minimum games required to be listed
    pub min_games_floor: u32,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            tier_weights: STATIC_TIER_WEIGHTS,
            tier_penalties: STATIC_TIER_PENALTIES,
            margin_cap: 28.0,
            upset_win_bonus: 0.3,
            expected_win_discount: 0.12,
            expected_win_floor: 0.1,
            bad_loss_penalty: 0.5,
            quality_loss_relief: 0.1,
            quality_loss_floor: 0.5,
            road_win_multiplier: 1.1,
            strength_offset: 50.0,
            strength_scale: 150.0,
            strength_floor: 0.01,
            strength_ceiling: 1.0,
            threshold_ratio: 0.6,
            min_games_floor: 4,
        }
    }
}

impl RatingConfig {
    pub fn tier_weight(&self, tier: Tier) -> f64 {
        self.tier_weights[tier.index()]
    }

    pub fn tier_penalty(&self, tier: Tier) -> f64 {
        self.tier_penalties[tier.index()]
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if self
            .tier_weights
            .iter()
            .any(|w| !w.is_finite() || *w <= 0.0 || *w > 1.0)
        {
            return Err(AnalyticsError::ConfigurationError {
                message: "Tier weights must be in (0, 1]".to_string(),
            }
            .into());
        }

        if self.tier_penalties.windows(2).any(|pair| pair[1] > pair[0]) {
            return Err(AnalyticsError::ConfigurationError {
                message: "Tier penalties must be non-increasing from tier 1 to tier 8".to_string(),
            }
            .into());
        }

        if self.margin_cap <= 0.0 {
            return Err(AnalyticsError::ConfigurationError {
                message: "Margin cap must be positive".to_string(),
            }
            .into());
        }

        if self.strength_scale <= 0.0 || self.strength_floor > self.strength_ceiling {
            return Err(AnalyticsError::ConfigurationError {
                message: "Strength scale must be positive and floor <= ceiling".to_string(),
            }
            .into());
        }

        if !(0.0..=1.0).contains(&self.threshold_ratio) {
            return Err(AnalyticsError::ConfigurationError {
                message: "Threshold ratio must be between 0 and 1".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rating_config_is_valid() {
        let config = RatingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tier_weight(Tier::STRONGEST), 1.0);
        assert_eq!(config.tier_penalty(Tier::WEAKEST), -145.0);
    }

    #[test]
    fn test_static_penalties_non_increasing() {
        assert!(STATIC_TIER_PENALTIES.windows(2).all(|p| p[1] <= p[0]));
    }

    #[test]
    fn test_rating_config_validation() {
        let mut config = RatingConfig::default();
        config.tier_penalties[3] = 10.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.tier_weights[0] = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.margin_cap = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.threshold_ratio = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RatingConfig = toml::from_str("margin_cap = 21.0").unwrap();
        assert_eq!(config.margin_cap, 21.0);
        assert_eq!(config.road_win_multiplier, 1.1);
    }
}
