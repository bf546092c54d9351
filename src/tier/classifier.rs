//! Tier classifier
//!
//! Maps a team, a conference label and a classification onto a strength
//! tier by walking the rules of a [`TierTable`] in strict precedence.

use crate::config::TierTable;
use crate::types::{Classification, Season, Tier};

/// Pure tier lookup over an immutable rule table
#[derive(Debug, Clone, Copy)]
pub struct TierClassifier<'a> {
    table: &'a TierTable,
}

impl<'a> TierClassifier<'a> {
    pub fn new(table: &'a TierTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a TierTable {
        self.table
    }

    /// Classify a team without a season; dated overrides never apply.
    pub fn tier(&self, team: &str, conference: Option<&str>, classification: Classification) -> Tier {
        self.tier_in_season(team, conference, classification, None)
    }

    /// Classify a team as of `season`.
    ///
    /// Precedence:
    /// 1. power independents playing under an independent marker are tier 1
    /// 2. teams listed as always tier 1
    /// 3. team overrides in force for `season` and `classification`
    /// 4. exact conference match
    /// 5. first substring match in table order, skipping denylisted keys
    /// 6. the classification default
    pub fn tier_in_season(
        &self,
        team: &str,
        conference: Option<&str>,
        classification: Classification,
        season: Option<Season>,
    ) -> Tier {
        let conference = conference.map(str::trim).filter(|c| !c.is_empty());

        if let Some(conf) = conference {
            if self.is_independent_marker(conf)
                && self.table.power_independents.iter().any(|t| t == team)
            {
                return Tier::STRONGEST;
            }
        }

        if self.table.always_tier_one.iter().any(|t| t == team) {
            return Tier::STRONGEST;
        }

        if let Some(season) = season {
            if let Some(rule) = self.table.team_overrides.iter().find(|rule| {
                rule.team == team
                    && rule.classification == classification
                    && season >= rule.from_season
            }) {
                return rule.tier;
            }
        }

        if let Some(conf) = conference {
            if let Some(tier) = self.conference_tier(conf) {
                return tier;
            }
        }

        self.table.defaults.for_classification(classification)
    }

    /// Tier from the conference table alone, without team overrides
    pub fn conference_tier(&self, conference: &str) -> Option<Tier> {
        let conference = conference.trim();
        if let Some(row) = self
            .table
            .conferences
            .iter()
            .find(|row| row.conference == conference)
        {
            return Some(row.tier);
        }

        self.table
            .conferences
            .iter()
            .filter(|row| !self.table.substring_denylist.contains(&row.conference))
            .find(|row| conference.contains(row.conference.as_str()))
            .map(|row| row.tier)
    }

    fn is_independent_marker(&self, conference: &str) -> bool {
        self.table
            .independent_markers
            .iter()
            .any(|marker| marker == conference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tiers::ConferenceTier;

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    #[test]
    fn test_power_independent_only_as_independent() {
        let table = TierTable::default();
        let classifier = TierClassifier::new(&table);
        assert_eq!(
            classifier.tier("Penn State", Some("Independent"), Classification::Fbs),
            tier(1)
        );
        // same team inside a mid-major league gets the league's tier
        assert_eq!(
            classifier.tier("Miami", Some("Mid-American"), Classification::Fbs),
            tier(2)
        );
        // an ordinary independent falls through to the table
        assert_eq!(
            classifier.tier("Army", Some("FBS Independents"), Classification::Fbs),
            tier(2)
        );
    }

    #[test]
    fn test_notre_dame_always_tier_one() {
        let table = TierTable::default();
        let classifier = TierClassifier::new(&table);
        assert_eq!(classifier.tier("Notre Dame", Some("ACC"), Classification::Fbs), tier(1));
        assert_eq!(classifier.tier("Notre Dame", None, Classification::Unknown), tier(1));
    }

    #[test]
    fn test_team_override_from_its_first_season() {
        let table = TierTable::default();
        let classifier = TierClassifier::new(&table);
        let osu = |season, classification| {
            classifier.tier_in_season("Oregon State", Some("Pac-12"), classification, season)
        };
        assert_eq!(osu(Some(2024), Classification::Fbs), tier(2));
        assert_eq!(osu(Some(2025), Classification::Fbs), tier(2));
        assert_eq!(osu(Some(2023), Classification::Fbs), tier(1));
        assert_eq!(osu(None, Classification::Fbs), tier(1));
        // only while FBS
        assert_eq!(osu(Some(2024), Classification::Fcs), tier(1));
        assert_eq!(
            classifier.tier_in_season("Oregon", Some("Big Ten"), Classification::Fbs, Some(2024)),
            tier(1)
        );
    }

    #[test]
    fn test_exact_then_substring_match() {
        let table = TierTable::default();
        let classifier = TierClassifier::new(&table);
        assert_eq!(classifier.tier("Georgia", Some("SEC"), Classification::Fbs), tier(1));
        assert_eq!(
            classifier.tier("Montana", Some("Big Sky Conference"), Classification::Fcs),
            tier(3)
        );
        assert_eq!(
            classifier.tier("Wisconsin-Whitewater", Some("WIAC"), Classification::DivisionIII),
            tier(7)
        );
    }

    #[test]
    fn test_denylisted_keys_never_match_as_substring() {
        let table = TierTable::default();
        let classifier = TierClassifier::new(&table);
        // "SEC" is inside "SECC" but must not be used as a substring key
        assert_eq!(
            classifier.tier("Some College", Some("SECC"), Classification::DivisionII),
            tier(6)
        );
        // "OAC" would otherwise match inside "GOAC"
        assert_eq!(
            classifier.tier("Kentucky State", Some("GOAC"), Classification::DivisionIII),
            tier(8)
        );
    }

    #[test]
    fn test_swac_is_not_southwest_conference() {
        let table = TierTable::default();
        let classifier = TierClassifier::new(&table);
        assert_eq!(
            classifier.tier("Grambling", Some("Southwestern Athletic"), Classification::Fcs),
            tier(4)
        );
        assert_eq!(
            classifier.tier("Texas", Some("Southwest Conference"), Classification::Fbs),
            tier(1)
        );
    }

    #[test]
    fn test_classification_fallback() {
        let table = TierTable::default();
        let classifier = TierClassifier::new(&table);
        assert_eq!(classifier.tier("X", None, Classification::Fbs), tier(2));
        assert_eq!(classifier.tier("X", Some("  "), Classification::Fcs), tier(4));
        assert_eq!(
            classifier.tier("X", Some("Nowhere League"), Classification::DivisionII),
            tier(6)
        );
        assert_eq!(classifier.tier("X", None, Classification::Unknown), tier(8));
    }

    #[test]
    fn test_custom_table_is_honoured() {
        let mut table = TierTable::default();
        table.conferences.insert(
            0,
            ConferenceTier {
                conference: "Ivy".to_string(),
                tier: tier(2),
            },
        );
        let classifier = TierClassifier::new(&table);
        assert_eq!(classifier.tier("Yale", Some("Ivy"), Classification::Fcs), tier(2));
    }
}
