//! Strength of schedule
//!
//! A simpler companion to SOR: each game is worth the opponent's win
//! percentage in that season, discounted by the opponent's classification.

use crate::graph::MatchupGraph;
use crate::source::{ConferenceLineage, TeamRegistry};
use crate::types::{AnalysisWindow, Classification, GameRecord, Outcome, Record, Season, TeamId};
use serde::Serialize;
use std::collections::HashMap;

/// Discount applied to an opponent's win percentage by classification
pub fn classification_weight(classification: Classification) -> f64 {
    match classification {
        Classification::Fbs => 1.0,
        Classification::Fcs => 0.6,
        Classification::DivisionII => 0.4,
        Classification::DivisionIII => 0.2,
        Classification::Unknown => 0.5,
    }
}

/// One opponent appearance on a schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledOpponent {
    pub opponent: TeamId,
    pub season: Season,
    pub classification: Classification,
    pub weight: f64,
    /// Opponent's record that season, if it played any scored game
    pub record: Option<Record>,
    /// e.g. `W 24-17`; absent for unscored games
    pub result: Option<String>,
}

impl ScheduledOpponent {
    pub fn weighted_pct(&self) -> Option<f64> {
        self.record.map(|r| r.win_pct() * self.weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SosReport {
    pub team: TeamId,
    /// Mean weighted win percentage x 100 over opponents with a record
    pub score: f64,
    pub games: usize,
    /// Strongest opponents first
    pub opponents: Vec<ScheduledOpponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SosRank {
    pub rank: usize,
    pub team: TeamId,
    pub score: f64,
    pub games: usize,
}

/// Schedule strength over a prebuilt graph.
///
/// The graph decides whose schedule counts. Opponent season records come
/// from `season_games`, every scored game in a window season, so the
/// conference and postseason filters never shrink an opponent's record.
pub struct SosCalculator<'a> {
    graph: &'a MatchupGraph,
    window: &'a AnalysisWindow,
    registry: &'a dyn TeamRegistry,
    lineage: &'a dyn ConferenceLineage,
    records: HashMap<&'a str, HashMap<Season, Record>>,
}

impl<'a> SosCalculator<'a> {
    pub fn new(
        graph: &'a MatchupGraph,
        window: &'a AnalysisWindow,
        season_games: &'a [GameRecord],
        registry: &'a dyn TeamRegistry,
        lineage: &'a dyn ConferenceLineage,
    ) -> Self {
        let mut records: HashMap<&'a str, HashMap<Season, Record>> = HashMap::new();
        let in_window = season_games
            .iter()
            .filter(|game| window.contains_season(game.season));
        for game in in_window {
            for team in [game.home_team.as_str(), game.away_team.as_str()] {
                if let Some(margin) = game.perspective(team).and_then(|view| view.margin()) {
                    records
                        .entry(team)
                        .or_default()
                        .entry(game.season)
                        .or_default()
                        .add(Outcome::from_margin(margin));
                }
            }
        }

        Self {
            graph,
            window,
            registry,
            lineage,
            records,
        }
    }

    pub fn season_record(&self, team: &str, season: Season) -> Option<Record> {
        self.records
            .get(team)
            .and_then(|seasons| seasons.get(&season))
            .copied()
    }

    fn same_conference(&self, game: &GameRecord) -> bool {
        if game.conference_game {
            return true;
        }
        match (&game.home_conference, &game.away_conference) {
            (Some(home), Some(away)) => {
                self.lineage.resolve(home, Some(game.season))
                    == self.lineage.resolve(away, Some(game.season))
            }
            _ => false,
        }
    }

    fn opponent_classification(&self, opponent: &str, game: &GameRecord) -> Classification {
        self.registry
            .profile(opponent)
            .map(|profile| profile.classification)
            .filter(Classification::is_known)
            .or_else(|| {
                game.perspective(opponent)
                    .map(|view| view.own_classification)
            })
            .unwrap_or(Classification::Unknown)
    }

    /// Schedule report for `team`; `None` when it has no usable game
    pub fn team(&self, team: &str, non_conference_only: bool) -> Option<SosReport> {
        let mut opponents = Vec::new();
        for opponent in self.graph.neighbors(team) {
            for game in self.graph.history(team, opponent) {
                if !self.window.contains_season(game.season) {
                    continue;
                }
                if non_conference_only && self.same_conference(game) {
                    continue;
                }

                let classification = self.opponent_classification(opponent, game);
                let result = game.perspective(team).and_then(|view| {
                    let (own, theirs) = (view.own_points?, view.opponent_points?);
                    Some(format!(
                        "{} {}-{}",
                        Outcome::from_margin(own - theirs).letter(),
                        own,
                        theirs
                    ))
                });
                opponents.push(ScheduledOpponent {
                    opponent: opponent.to_string(),
                    season: game.season,
                    classification,
                    weight: classification_weight(classification),
                    record: self
                        .season_record(opponent, game.season)
                        .filter(|record| record.games() > 0),
                    result,
                });
            }
        }

        let weighted: Vec<f64> = opponents.iter().filter_map(|o| o.weighted_pct()).collect();
        if weighted.is_empty() {
            return None;
        }

        opponents.sort_by(|a, b| {
            b.weighted_pct()
                .unwrap_or(-1.0)
                .total_cmp(&a.weighted_pct().unwrap_or(-1.0))
        });
        Some(SosReport {
            team: team.to_string(),
            score: crate::utils::mean(&weighted) * 100.0,
            games: opponents.len(),
            opponents,
        })
    }

    /// Every team with at least `min_games` scheduled games, strongest first
    pub fn leaderboard(&self, min_games: usize, non_conference_only: bool) -> Vec<SosRank> {
        let mut scored: Vec<(TeamId, f64, usize)> = self
            .graph
            .teams()
            .filter_map(|team| self.team(team, non_conference_only))
            .filter(|report| report.games >= min_games)
            .map(|report| (report.team, report.score, report.games))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .enumerate()
            .map(|(index, (team, score, games))| SosRank {
                rank: index + 1,
                team,
                score,
                games,
            })
            .collect()
    }
}
