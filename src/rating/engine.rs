//! Strength-of-record engine
//!
//! Two fixed passes over the matchup graph. Pass 0 seeds each team's
//! opponent strength from static tier weights; pass 1 replaces the weights
//! with the previous pass's ratings. Only the final pass produces rows.
//! Opponent strength feeds the per-game modifier trace; the grade itself
//! depends on margin, tiers and location.

use crate::config::RatingConfig;
use crate::error::Result;
use crate::graph::MatchupGraph;
use crate::rating::grade::{GameContext, GameGrade, GameGrader};
use crate::tier::TierAssignments;
use crate::types::{AnalysisWindow, Classification, GameRecord, Outcome, Season, Tier, TeamId};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Number of relaxation passes. Bounded on purpose; do not iterate to a fixed point.
pub const CONVERGENCE_PASSES: usize = 2;

/// One graded game in a single-team report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameDetail {
    pub opponent: TeamId,
    pub season: Season,
    pub week: Option<u32>,
    pub is_home: bool,
    pub own_points: i32,
    pub opponent_points: i32,
    pub outcome: Outcome,
    pub grade: f64,
    /// e.g. `Str:0.80 Tier:G5(1.00x) Road(1.10x)`
    pub modifiers: String,
}

impl GameDetail {
    /// Result string such as `W 30-10`
    pub fn result(&self) -> String {
        format!(
            "{} {}-{}",
            self.outcome.letter(),
            self.own_points,
            self.opponent_points
        )
    }
}

/// Final rating for one team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SorRow {
    pub team: TeamId,
    pub total_score: f64,
    pub avg_sor: f64,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub point_diff: i64,
    pub calc_tier: Tier,
    pub display_tier: Tier,
    pub conference: Option<String>,
    pub classification: Classification,
    /// Filled only for a single-team request
    pub details: Vec<GameDetail>,
}

impl SorRow {
    pub fn record(&self) -> String {
        format!("{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

impl fmt::Display for SorRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {:.1} over {} games",
            self.team,
            self.record(),
            self.total_score,
            self.games_played
        )
    }
}

/// Rows of the final pass plus data-quality counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SorOutcome {
    pub rows: Vec<SorRow>,
    /// In-window games that could not be graded for lack of a score
    pub skipped_games: usize,
}

impl SorOutcome {
    pub fn row(&self, team: &str) -> Option<&SorRow> {
        self.rows.iter().find(|row| row.team == team)
    }
}

/// Per-team opponent strength for one pass
type StrengthMap = HashMap<TeamId, f64>;

/// Stateless rating engine; all state lives inside [`SorEngine::run`]
pub struct SorEngine<'a> {
    config: &'a RatingConfig,
    grader: &'a dyn GameGrader,
}

impl<'a> SorEngine<'a> {
    pub fn new(config: &'a RatingConfig, grader: &'a dyn GameGrader) -> Self {
        Self { config, grader }
    }

    /// Rate every team in `graph`, or only `target` in the final pass.
    ///
    /// An unresolvable target fails with `TeamNotFound`. Teams without a
    /// gradable game produce no row.
    pub fn run(
        &self,
        graph: &MatchupGraph,
        assignments: &TierAssignments,
        window: &AnalysisWindow,
        target: Option<&str>,
    ) -> Result<SorOutcome> {
        window.validate()?;
        let target = target.map(|t| graph.require_team(t)).transpose()?;

        let mut prior: HashMap<TeamId, f64> = HashMap::new();
        let mut rows = Vec::new();

        for pass in 0..CONVERGENCE_PASSES {
            let is_final = pass + 1 == CONVERGENCE_PASSES;
            let strength = self.opponent_strength(graph, assignments, window, pass, &prior);

            let teams: Vec<&str> = match (target, is_final) {
                (Some(team), true) => vec![team],
                _ => graph.teams().collect(),
            };

            let pass_rows: Vec<SorRow> = teams
                .into_iter()
                .filter_map(|team| {
                    self.grade_team(graph, assignments, window, team, &strength, is_final && target.is_some())
                })
                .collect();

            debug!("SOR pass {} graded {} teams", pass, pass_rows.len());
            for row in &pass_rows {
                prior.insert(row.team.clone(), row.total_score);
            }
            if is_final {
                rows = pass_rows;
            }
        }

        let skipped_games = count_unscored(graph, window);
        info!(
            "Rated {} teams over {}-{} ({} unscored games skipped)",
            rows.len(),
            window.start_year,
            window.end_year,
            skipped_games
        );

        Ok(SorOutcome {
            rows,
            skipped_games,
        })
    }

    fn opponent_strength(
        &self,
        graph: &MatchupGraph,
        assignments: &TierAssignments,
        window: &AnalysisWindow,
        pass: usize,
        prior: &HashMap<TeamId, f64>,
    ) -> StrengthMap {
        graph
            .teams()
            .map(|team| {
                let values: Vec<f64> = graph
                    .neighbors(team)
                    .filter(|opponent| {
                        graph
                            .history(team, opponent)
                            .iter()
                            .any(|game| window.contains_season(game.season))
                    })
                    .map(|opponent| {
                        if pass == 0 {
                            self.config.tier_weight(assignments.calc_tier(opponent))
                        } else {
                            let rating = prior.get(opponent).copied().unwrap_or(0.0);
                            ((rating + self.config.strength_offset) / self.config.strength_scale)
                                .clamp(self.config.strength_floor, self.config.strength_ceiling)
                        }
                    })
                    .collect();
                (team.to_string(), crate::utils::mean(&values))
            })
            .collect()
    }

    fn grade_team(
        &self,
        graph: &MatchupGraph,
        assignments: &TierAssignments,
        window: &AnalysisWindow,
        team: &str,
        strength: &StrengthMap,
        with_details: bool,
    ) -> Option<SorRow> {
        let own_tier = assignments.calc_tier(team);
        let mut grades = Vec::new();
        let mut details = Vec::new();
        let (mut wins, mut losses, mut ties) = (0u32, 0u32, 0u32);
        let mut point_diff = 0i64;

        for opponent in graph.neighbors(team) {
            let opponent_tier = assignments.calc_tier(opponent);
            for game in graph.history(team, opponent) {
                let Some((is_home, own, theirs)) = gradable(game, team, window) else {
                    continue;
                };

                let margin = own - theirs;
                point_diff += margin as i64;
                let outcome = Outcome::from_margin(margin);
                match outcome {
                    Outcome::Win => wins += 1,
                    Outcome::Loss => losses += 1,
                    Outcome::Tie => ties += 1,
                }

                let graded = self.grader.grade(&GameContext {
                    margin,
                    is_home,
                    own_tier,
                    opponent_tier,
                });
                grades.push(graded.grade);

                if with_details {
                    let opponent_strength = strength.get(opponent).copied().unwrap_or(0.0);
                    details.push(GameDetail {
                        opponent: opponent.to_string(),
                        season: game.season,
                        week: game.week,
                        is_home,
                        own_points: own,
                        opponent_points: theirs,
                        outcome,
                        grade: graded.grade,
                        modifiers: modifier_trace(opponent_strength, opponent_tier, &graded),
                    });
                }
            }
        }

        if grades.is_empty() {
            return None;
        }

        let avg_sor = crate::utils::mean(&grades);
        let assignment = assignments.get(team);
        Some(SorRow {
            team: team.to_string(),
            total_score: avg_sor + self.grader.tier_penalty(own_tier),
            avg_sor,
            games_played: grades.len() as u32,
            wins,
            losses,
            ties,
            point_diff,
            calc_tier: own_tier,
            display_tier: assignments.display_tier(team),
            conference: assignment.and_then(|a| a.conference.clone()),
            classification: assignment
                .map(|a| a.classification)
                .unwrap_or(Classification::Unknown),
            details,
        })
    }
}

/// Side, own score and opponent score when the game counts for grading
fn gradable(game: &GameRecord, team: &str, window: &AnalysisWindow) -> Option<(bool, i32, i32)> {
    if !window.contains_season(game.season) || !window.contains_week(game.week) {
        return None;
    }
    let view = game.perspective(team)?;
    Some((view.is_home, view.own_points?, view.opponent_points?))
}

fn modifier_trace(opponent_strength: f64, opponent_tier: Tier, graded: &GameGrade) -> String {
    let mut trace = format!(
        "Str:{:.2} Tier:{}({:.2}x)",
        opponent_strength,
        opponent_tier.label(),
        graded.tier_multiplier
    );
    if graded.location_multiplier != 1.0 {
        trace.push_str(&format!(" Road({:.2}x)", graded.location_multiplier));
    }
    trace
}

/// In-window rows without both scores. Every game lives on exactly one
/// edge, so each is counted once.
fn count_unscored(graph: &MatchupGraph, window: &AnalysisWindow) -> usize {
    graph
        .edges()
        .flat_map(|edge| edge.history())
        .filter(|game| {
            window.contains_season(game.season)
                && window.contains_week(game.week)
                && !game.has_scores()
        })
        .count()
}
