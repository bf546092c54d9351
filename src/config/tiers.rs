//! Conference → tier tables used by the tier classifier

use crate::error::AnalyticsError;
use crate::types::{Classification, Season, Tier};
use serde::{Deserialize, Serialize};

/// One row of the conference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceTier {
    pub conference: String,
    pub tier: Tier,
}

/// Fixed tier for one program from a given season on, while it holds the
/// stated classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamTierOverride {
    pub team: String,
    pub tier: Tier,
    pub classification: Classification,
    pub from_season: Season,
}

/// Fallback tiers when no conference rule applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationDefaults {
    pub fbs: Tier,
    pub fcs: Tier,
    pub division_ii: Tier,
    pub division_iii: Tier,
    pub unknown: Tier,
}

impl Default for ClassificationDefaults {
    fn default() -> Self {
        Self {
            fbs: tier(2),
            fcs: tier(4),
            division_ii: tier(6),
            division_iii: tier(8),
            unknown: tier(8),
        }
    }
}

impl ClassificationDefaults {
    pub fn for_classification(&self, classification: Classification) -> Tier {
        match classification {
            Classification::Fbs => self.fbs,
            Classification::Fcs => self.fcs,
            Classification::DivisionII => self.division_ii,
            Classification::DivisionIII => self.division_iii,
            Classification::Unknown => self.unknown,
        }
    }
}

/// Static tier rules. Row order matters: substring matching walks the
/// conference table top to bottom and stops at the first hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    /// Programs treated as tier 1 while playing as independents
    pub power_independents: Vec<String>,
    /// Conference labels that mark an independent schedule
    pub independent_markers: Vec<String>,
    /// Programs that are tier 1 regardless of conference
    pub always_tier_one: Vec<String>,
    /// Dated per-team tiers, checked after `always_tier_one`
    pub team_overrides: Vec<TeamTierOverride>,
    pub conferences: Vec<ConferenceTier>,
    /// Keys too short to be trusted as substrings of longer names
    pub substring_denylist: Vec<String>,
    pub defaults: ClassificationDefaults,
}

fn tier(value: u8) -> Tier {
    Tier::new(value).unwrap_or(Tier::WEAKEST)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

const DEFAULT_CONFERENCES: &[(&str, u8)] = &[
    // Power conferences and their lineages
    ("SEC", 1),
    ("Big Ten", 1),
    ("Big 12", 1),
    ("ACC", 1),
    ("Pac-12", 1),
    ("Southeastern Conference", 1),
    ("Big Ten Conference", 1),
    ("Atlantic Coast Conference", 1),
    ("Pac-10", 1),
    ("SWC", 1),
    ("Big Eight", 1),
    // Mid-majors
    ("American Athletic", 2),
    ("Mountain West", 2),
    ("Sun Belt", 2),
    ("MAC", 2),
    ("Conference USA", 2),
    ("Mid-American", 2),
    ("FBS Independents", 2),
    // FCS power
    ("Missouri Valley", 3),
    ("MVFC", 3),
    ("Big Sky", 3),
    ("CAA", 3),
    ("Colonial", 3),
    ("Southern", 3),
    ("SoCon", 3),
    ("Southland", 3),
    ("Ivy", 3),
    // Division II power
    ("GLIAC", 5),
    ("Gulf South", 5),
    ("MIAA", 5),
    ("PSAC", 5),
    ("Lone Star", 5),
    // Division III and other
    ("WIAC", 7),
    ("OAC", 7),
    ("American Southwest", 7),
    ("CCIW", 7),
    ("NACC", 8),
    ("NEWMAC", 8),
    ("Centennial", 7),
    ("Empire 8", 7),
    ("NJAC", 8),
    ("ODAC", 8),
    ("Liberty League", 8),
    // Historical power lineages
    ("Big Six", 1),
    ("Big 6", 1),
    ("Big Seven", 1),
    ("Big 7", 1),
    ("Big 8", 1),
    ("Southwestern Athletic", 4),
    ("SWAC", 4),
    ("Southwest", 1),
    ("Southwest Conference", 1),
    ("Big 12 Conference", 1),
    ("Southeastern", 1),
];

impl Default for TierTable {
    fn default() -> Self {
        Self {
            power_independents: strings(&[
                "Notre Dame",
                "Penn State",
                "Miami",
                "Florida State",
                "Syracuse",
                "Pittsburgh",
                "Boston College",
                "West Virginia",
                "Virginia Tech",
                "South Carolina",
                "BYU",
            ]),
            independent_markers: strings(&["FBS Independents", "Independent"]),
            always_tier_one: strings(&["Notre Dame"]),
            // the two programs left behind in the 2024 Pac-12
            team_overrides: ["Oregon State", "Washington State"]
                .iter()
                .map(|team| TeamTierOverride {
                    team: team.to_string(),
                    tier: tier(2),
                    classification: Classification::Fbs,
                    from_season: 2024,
                })
                .collect(),
            conferences: DEFAULT_CONFERENCES
                .iter()
                .map(|(conference, t)| ConferenceTier {
                    conference: conference.to_string(),
                    tier: tier(*t),
                })
                .collect(),
            substring_denylist: strings(&["ACC", "MAC", "SEC", "CAA", "OAC"]),
            defaults: ClassificationDefaults::default(),
        }
    }
}

impl TierTable {
    /// Validate table contents
    pub fn validate(&self) -> crate::error::Result<()> {
        if let Some(row) = self
            .conferences
            .iter()
            .find(|row| row.conference.trim().is_empty())
        {
            return Err(AnalyticsError::ConfigurationError {
                message: format!("Conference table has an empty key (tier {})", row.tier.get()),
            }
            .into());
        }
        if let Some(rule) = self
            .team_overrides
            .iter()
            .find(|rule| rule.team.trim().is_empty())
        {
            return Err(AnalyticsError::ConfigurationError {
                message: format!("Team override from {} has no team", rule.from_season),
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
    fn test_default_table_valid() {
        let table = TierTable::default();
        assert!(table.validate().is_ok());
        assert!(table
            .conferences
            .iter()
            .any(|row| row.conference == "Big Eight" && row.tier == Tier::STRONGEST));
    }

    #[test]
    fn test_classification_defaults() {
        let defaults = ClassificationDefaults::default();
        assert_eq!(defaults.for_classification(Classification::Fbs).get(), 2);
        assert_eq!(defaults.for_classification(Classification::Fcs).get(), 4);
        assert_eq!(defaults.for_classification(Classification::DivisionII).get(), 6);
        assert_eq!(defaults.for_classification(Classification::DivisionIII).get(), 8);
        assert_eq!(defaults.for_classification(Classification::Unknown).get(), 8);
    }

    #[test]
    fn test_default_overrides_cover_pac_two() {
        let table = TierTable::default();
        let teams: Vec<&str> = table.team_overrides.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["Oregon State", "Washington State"]);
        assert!(table
            .team_overrides
            .iter()
            .all(|r| r.from_season == 2024 && r.tier.get() == 2));

        let mut table = TierTable::default();
        table.team_overrides[0].team = String::new();
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_empty_conference_key_rejected() {
        let mut table = TierTable::default();
        table.conferences.push(ConferenceTier {
            conference: "  ".to_string(),
            tier: Tier::WEAKEST,
        });
        assert!(table.validate().is_err());
    }
}
