//! Team registry: where each program sits and has sat
//!
//! The registry answers three questions for the core: a team's most recent
//! known conference and classification, its most recent regular-season
//! membership inside a window (for display tiers), and which teams held
//! membership in which conferences over a span of seasons.

use crate::error::{AnalyticsError, Result};
use crate::types::{Classification, GameRecord, Season, SeasonType, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Most recent known affiliation for a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamProfile {
    #[serde(alias = "team")]
    pub school: TeamId,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub classification: Classification,
}

/// A conference membership spanning one or more seasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(alias = "school")]
    pub team: TeamId,
    pub conference: String,
    #[serde(default = "Membership::open_start")]
    pub start_year: Season,
    #[serde(default = "Membership::open_end")]
    pub end_year: Season,
    #[serde(default)]
    pub classification: Classification,
}

impl Membership {
    fn open_start() -> Season {
        1869
    }

    fn open_end() -> Season {
        9999
    }

    pub fn overlaps(&self, start: Season, end: Season) -> bool {
        self.start_year <= end && start <= self.end_year
    }
}

/// Affiliation during one specific regular season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonMembership {
    pub season: Season,
    pub conference: String,
    pub classification: Classification,
}

/// Trait for looking up team affiliations
#[cfg_attr(test, mockall::automock)]
pub trait TeamRegistry: Send + Sync {
    /// Latest known conference and classification
    fn profile(&self, team: &str) -> Option<TeamProfile>;

    /// Affiliation in the last regular season within `[start, end]`
    fn last_regular_season_membership(
        &self,
        team: &str,
        start: Season,
        end: Season,
    ) -> Option<SeasonMembership>;

    /// Membership spans overlapping `[start, end]`
    fn memberships(&self, start: Season, end: Season) -> Vec<Membership>;

    /// Teams whose latest classification is one of `classifications`
    fn teams_with_classification(&self, classifications: &[Classification]) -> HashSet<TeamId>;
}

/// In-memory registry assembled from profile and membership files, from the
/// game rows themselves, or both
#[derive(Debug, Clone, Default)]
pub struct InMemoryTeamRegistry {
    profiles: HashMap<TeamId, TeamProfile>,
    memberships: Vec<Membership>,
    seasons: HashMap<TeamId, BTreeMap<Season, SeasonMembership>>,
}

impl InMemoryTeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive profiles and per-season memberships from regular-season games.
    /// Within a season the latest week wins.
    pub fn from_games(games: &[GameRecord]) -> Self {
        let mut registry = Self::new();
        let mut ordered: Vec<&GameRecord> = games.iter().collect();
        ordered.sort_by_key(|game| game.chronological_key());

        for game in ordered {
            for team in [&game.home_team, &game.away_team] {
                let Some(view) = game.perspective(team) else {
                    continue;
                };

                let profile = registry
                    .profiles
                    .entry(team.clone())
                    .or_insert_with(|| TeamProfile {
                        school: team.clone(),
                        conference: None,
                        classification: Classification::Unknown,
                    });
                if let Some(conference) = view.own_conference {
                    profile.conference = Some(conference.to_string());
                }
                if view.own_classification.is_known() {
                    profile.classification = view.own_classification;
                }

                if game.season_type != SeasonType::Regular {
                    continue;
                }
                if let Some(conference) = view.own_conference {
                    let seasons = registry.seasons.entry(team.clone()).or_default();
                    let previous = seasons.get(&game.season).map(|m| m.classification);
                    let classification = if view.own_classification.is_known() {
                        view.own_classification
                    } else {
                        previous.unwrap_or(Classification::Unknown)
                    };
                    seasons.insert(
                        game.season,
                        SeasonMembership {
                            season: game.season,
                            conference: conference.to_string(),
                            classification,
                        },
                    );
                }
            }
        }

        registry
    }

    /// Replace or add explicit team profiles
    pub fn with_profiles(mut self, profiles: Vec<TeamProfile>) -> Self {
        for profile in profiles {
            self.profiles.insert(profile.school.clone(), profile);
        }
        self
    }

    /// Add explicit historical memberships
    pub fn with_memberships(mut self, memberships: Vec<Membership>) -> Self {
        self.memberships.extend(memberships);
        self
    }

    /// Load team profiles from a JSON array file
    pub fn load_profiles(path: &Path) -> Result<Vec<TeamProfile>> {
        read_json(path)
    }

    /// Load historical memberships from a JSON array file
    pub fn load_memberships(path: &Path) -> Result<Vec<Membership>> {
        read_json(path)
    }

    pub fn team_count(&self) -> usize {
        self.profiles.len()
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| AnalyticsError::DataSource {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        AnalyticsError::DataSource {
            message: format!("Failed to parse {}: {}", path.display(), e),
        }
        .into()
    })
}

impl TeamRegistry for InMemoryTeamRegistry {
    fn profile(&self, team: &str) -> Option<TeamProfile> {
        self.profiles.get(team).cloned()
    }

    fn last_regular_season_membership(
        &self,
        team: &str,
        start: Season,
        end: Season,
    ) -> Option<SeasonMembership> {
        if let Some(found) = self
            .seasons
            .get(team)
            .and_then(|seasons| seasons.range(start..=end).next_back())
            .map(|(_, membership)| membership.clone())
        {
            return Some(found);
        }

        // Fall back to explicit spans; the latest overlap wins
        let fallback_classification = self
            .profiles
            .get(team)
            .map(|p| p.classification)
            .unwrap_or(Classification::Unknown);
        self.memberships
            .iter()
            .filter(|m| m.team == team && m.overlaps(start, end))
            .max_by_key(|m| m.end_year.min(end))
            .map(|m| SeasonMembership {
                season: m.end_year.min(end),
                conference: m.conference.clone(),
                classification: if m.classification.is_known() {
                    m.classification
                } else {
                    fallback_classification
                },
            })
    }

    fn memberships(&self, start: Season, end: Season) -> Vec<Membership> {
        let mut spans: Vec<Membership> = self
            .memberships
            .iter()
            .filter(|m| m.overlaps(start, end))
            .cloned()
            .collect();

        let mut teams: Vec<&TeamId> = self.seasons.keys().collect();
        teams.sort();
        for team in teams {
            for membership in self.seasons[team].range(start..=end).map(|(_, m)| m) {
                spans.push(Membership {
                    team: team.clone(),
                    conference: membership.conference.clone(),
                    start_year: membership.season,
                    end_year: membership.season,
                    classification: membership.classification,
                });
            }
        }
        spans
    }

    fn teams_with_classification(&self, classifications: &[Classification]) -> HashSet<TeamId> {
        self.profiles
            .values()
            .filter(|profile| classifications.contains(&profile.classification))
            .map(|profile| profile.school.clone())
            .collect()
    }
}
