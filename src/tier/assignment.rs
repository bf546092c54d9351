//! Per-window tier assignment
//!
//! Every team gets two tiers for a window. The calculation tier comes from
//! the conference it played in most often and drives the rating math. The
//! display tier comes from its last regular season in the window and is only
//! used to label and group output.

use crate::graph::MatchupGraph;
use crate::source::{ConferenceLineage, TeamRegistry};
use crate::tier::classifier::TierClassifier;
use crate::types::{AnalysisWindow, Classification, GameRecord, Tier, TeamId};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierAssignment {
    pub team: TeamId,
    /// Majority canonical conference over the window
    pub conference: Option<String>,
    /// Most recent known classification over the window
    pub classification: Classification,
    pub calc_tier: Tier,
    pub display_tier: Tier,
    /// Conference of the last regular season, when the registry knows it
    pub display_conference: Option<String>,
}

/// Assignments for every team in a graph
#[derive(Debug, Clone, Default)]
pub struct TierAssignments {
    by_team: HashMap<TeamId, TierAssignment>,
}

/// Most frequent label; ties go to the label seen most recently
fn majority_label(labels: &[String]) -> Option<String> {
    let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, label) in labels.iter().enumerate() {
        let entry = tally.entry(label.as_str()).or_insert((0, position));
        entry.0 += 1;
        entry.1 = position;
    }
    tally
        .into_iter()
        .max_by_key(|&(_, (count, last_seen))| (count, last_seen))
        .map(|(label, _)| label.to_string())
}

impl TierAssignments {
    pub fn compute(
        graph: &MatchupGraph,
        window: &AnalysisWindow,
        classifier: &TierClassifier<'_>,
        lineage: &dyn ConferenceLineage,
        registry: &dyn TeamRegistry,
    ) -> Self {
        let mut by_team = HashMap::with_capacity(graph.node_count());

        for team in graph.teams() {
            let mut games: Vec<&GameRecord> = graph
                .neighbors(team)
                .flat_map(|opponent| graph.history(team, opponent))
                .filter(|game| window.contains_season(game.season))
                .collect();
            games.sort_by_key(|game| game.chronological_key());

            let mut labels = Vec::with_capacity(games.len());
            let mut classification = Classification::Unknown;
            for game in &games {
                let Some(view) = game.perspective(team) else {
                    continue;
                };
                if let Some(label) = view.own_conference.map(str::trim).filter(|l| !l.is_empty()) {
                    labels.push(lineage.resolve(label, Some(game.season)));
                }
                if view.own_classification.is_known() {
                    classification = view.own_classification;
                }
            }

            let conference = majority_label(&labels);
            let last_played = games.last().map(|game| game.season);
            let calc_tier =
                classifier.tier_in_season(team, conference.as_deref(), classification, last_played);

            let last_season = registry
                .last_regular_season_membership(team, window.start_year, window.end_year)
                .filter(|membership| membership.classification.is_known());
            let (display_tier, display_conference) = match last_season {
                Some(membership) => {
                    let resolved = lineage.resolve(&membership.conference, Some(membership.season));
                    let tier = classifier.tier_in_season(
                        team,
                        Some(&resolved),
                        membership.classification,
                        Some(membership.season),
                    );
                    (tier, Some(resolved))
                }
                None => (calc_tier, None),
            };

            by_team.insert(
                team.to_string(),
                TierAssignment {
                    team: team.to_string(),
                    conference,
                    classification,
                    calc_tier,
                    display_tier,
                    display_conference,
                },
            );
        }

        debug!("Assigned tiers for {} teams", by_team.len());
        Self { by_team }
    }

    pub fn get(&self, team: &str) -> Option<&TierAssignment> {
        self.by_team.get(team)
    }

    /// Calculation tier; teams outside the graph are treated as weakest
    pub fn calc_tier(&self, team: &str) -> Tier {
        self.by_team
            .get(team)
            .map(|a| a.calc_tier)
            .unwrap_or(Tier::WEAKEST)
    }

    pub fn display_tier(&self, team: &str) -> Tier {
        self.by_team
            .get(team)
            .map(|a| a.display_tier)
            .unwrap_or_else(|| self.calc_tier(team))
    }

    pub fn len(&self) -> usize {
        self.by_team.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_team.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierTable;
    use crate::source::registry::MockTeamRegistry;
    use crate::source::{IdentityLineage, InMemoryTeamRegistry, LineageTable, SeasonMembership};
    use crate::types::Season;

    fn game(season: Season, home: (&str, &str), away: (&str, &str)) -> GameRecord {
        let mut game = GameRecord::final_score(season, 1, home.0, 21, away.0, 14);
        game.home_conference = Some(home.1.to_string());
        game.away_conference = Some(away.1.to_string());
        game.home_classification = Classification::Fbs;
        game.away_classification = Classification::Fbs;
        game
    }

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    #[test]
    fn test_majority_label_tie_goes_to_most_recent() {
        let labels: Vec<String> = ["WAC", "Mountain West", "WAC", "Mountain West"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(majority_label(&labels).as_deref(), Some("Mountain West"));
        assert_eq!(majority_label(&[]), None);
    }

    #[test]
    fn test_calc_tier_uses_majority_conference() {
        let games = vec![
            game(2008, ("Utah", "Mountain West"), ("BYU", "Mountain West")),
            game(2009, ("Utah", "Mountain West"), ("BYU", "Mountain West")),
            game(2010, ("Utah", "Mountain West"), ("BYU", "Mountain West")),
            game(2011, ("Utah", "Pac-12"), ("BYU", "FBS Independents")),
        ];
        let graph = MatchupGraph::build(&games, None);
        let table = TierTable::default();
        let classifier = TierClassifier::new(&table);
        let registry = InMemoryTeamRegistry::from_games(&games);
        let assignments = TierAssignments::compute(
            &graph,
            &AnalysisWindow::seasons(2008, 2011),
            &classifier,
            &IdentityLineage,
            &registry,
        );

        let utah = assignments.get("Utah").unwrap();
        assert_eq!(utah.conference.as_deref(), Some("Mountain West"));
        assert_eq!(utah.calc_tier, tier(2));
        // last regular season was in the Pac-12
        assert_eq!(utah.display_tier, tier(1));
        assert_eq!(utah.display_conference.as_deref(), Some("Pac-12"));
    }

    #[test]
    fn test_pac_two_override_follows_the_window() {
        let games = vec![
            game(2023, ("Oregon State", "Pac-12"), ("Washington State", "Pac-12")),
            game(2024, ("Oregon State", "Pac-12"), ("Washington State", "Pac-12")),
        ];
        let graph = MatchupGraph::build(&games, None);
        let table = TierTable::default();
        let classifier = TierClassifier::new(&table);
        let registry = InMemoryTeamRegistry::from_games(&games);

        let before = TierAssignments::compute(
            &graph,
            &AnalysisWindow::seasons(2023, 2023),
            &classifier,
            &IdentityLineage,
            &registry,
        );
        assert_eq!(before.calc_tier("Oregon State"), tier(1));
        assert_eq!(before.display_tier("Washington State"), tier(1));

        let after = TierAssignments::compute(
            &graph,
            &AnalysisWindow::seasons(2023, 2024),
            &classifier,
            &IdentityLineage,
            &registry,
        );
        assert_eq!(after.calc_tier("Oregon State"), tier(2));
        assert_eq!(after.display_tier("Washington State"), tier(2));
    }

    #[test]
    fn test_lineage_folds_aliases_before_counting() {
        let games = vec![
            game(1990, ("Nebraska", "Big 8"), ("Oklahoma", "Big 8")),
            game(1991, ("Nebraska", "Big Eight"), ("Oklahoma", "Big Eight")),
            game(1992, ("Nebraska", "Big Eight Conference"), ("Colorado", "Big Eight")),
            game(1993, ("Nebraska", "Other"), ("Kansas", "Other")),
            game(1994, ("Nebraska", "Other"), ("Kansas", "Other")),
        ];
        let graph = MatchupGraph::build(&games, None);
        let table = TierTable::default();
        let assignments = TierAssignments::compute(
            &graph,
            &AnalysisWindow::seasons(1990, 1994),
            &TierClassifier::new(&table),
            &LineageTable::builtin(),
            &InMemoryTeamRegistry::new(),
        );

        let nebraska = assignments.get("Nebraska").unwrap();
        assert_eq!(nebraska.conference.as_deref(), Some("Big Eight"));
        assert_eq!(nebraska.calc_tier, tier(1));
        // no registry data: display falls back to the calculation tier
        assert_eq!(nebraska.display_tier, nebraska.calc_tier);
    }

    #[test]
    fn test_games_outside_window_do_not_vote() {
        let games = vec![
            game(1980, ("Tulane", "SEC"), ("LSU", "SEC")),
            game(1981, ("Tulane", "SEC"), ("LSU", "SEC")),
            game(2000, ("Tulane", "Conference USA"), ("LSU", "SEC")),
        ];
        let graph = MatchupGraph::build(&games, None);
        let table = TierTable::default();
        let assignments = TierAssignments::compute(
            &graph,
            &AnalysisWindow::seasons(1995, 2005),
            &TierClassifier::new(&table),
            &IdentityLineage,
            &InMemoryTeamRegistry::new(),
        );
        assert_eq!(assignments.calc_tier("Tulane"), tier(2));
        assert_eq!(assignments.calc_tier("LSU"), tier(1));
        assert_eq!(assignments.calc_tier("Unknown Team"), Tier::WEAKEST);
    }

    #[test]
    fn test_display_tier_ignores_unknown_classification() {
        let games = vec![game(2015, ("Team", "Sun Belt"), ("Other", "Sun Belt"))];
        let graph = MatchupGraph::build(&games, None);
        let table = TierTable::default();

        let mut registry = MockTeamRegistry::new();
        registry
            .expect_last_regular_season_membership()
            .returning(|team, _, _| {
                Some(SeasonMembership {
                    season: 2015,
                    conference: "SEC".to_string(),
                    classification: if team == "Team" {
                        Classification::Unknown
                    } else {
                        Classification::Fbs
                    },
                })
            });

        let assignments = TierAssignments::compute(
            &graph,
            &AnalysisWindow::seasons(2015, 2015),
            &TierClassifier::new(&table),
            &IdentityLineage,
            &registry,
        );
        assert_eq!(assignments.display_tier("Team"), tier(2));
        assert_eq!(assignments.display_tier("Other"), tier(1));
        assert_eq!(assignments.len(), 2);
    }
}
