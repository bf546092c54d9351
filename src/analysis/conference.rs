//! Conference membership reports
//!
//! Members are resolved through the lineage (so "Big 8" and "Big Eight" are
//! the same league) and the registry's membership spans, which must overlap
//! the requested window.

use crate::graph::MatchupGraph;
use crate::source::{ConferenceLineage, TeamRegistry};
use crate::types::{AnalysisWindow, GameRecord, Outcome, Record, Season, TeamId};
use serde::Serialize;
use std::collections::BTreeSet;

/// Teams that belonged to `conference` at some point in `[start, end]`, sorted
pub fn conference_members(
    registry: &dyn TeamRegistry,
    lineage: &dyn ConferenceLineage,
    conference: &str,
    start: Season,
    end: Season,
) -> Vec<TeamId> {
    let target = lineage.resolve(conference, None);
    let members: BTreeSet<TeamId> = registry
        .memberships(start, end)
        .into_iter()
        .filter(|membership| membership.overlaps(start, end))
        .filter(|membership| {
            lineage.resolve(&membership.conference, Some(membership.start_year)) == target
                || lineage.resolve(&membership.conference, None) == target
        })
        .map(|membership| membership.team)
        .collect();
    members.into_iter().collect()
}

/// Scored games of a pair that fall inside the window
fn counted<'g>(
    graph: &'g MatchupGraph,
    window: &AnalysisWindow,
    team: &str,
    opponent: &str,
) -> Vec<&'g GameRecord> {
    graph
        .history(team, opponent)
        .iter()
        .filter(|game| {
            window.contains_season(game.season)
                && window.contains_week(game.week)
                && game.has_scores()
        })
        .collect()
}

/// One cross-conference pairing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSeries {
    pub team: TeamId,
    pub opponent: TeamId,
    /// From `team`'s side
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConferenceShowdown {
    pub first: String,
    pub second: String,
    /// From the first conference's side
    pub record: Record,
    pub first_points: i64,
    pub second_points: i64,
    pub first_longest_streak: u32,
    pub second_longest_streak: u32,
    /// Most games first
    pub series: Vec<PairSeries>,
}

impl ConferenceShowdown {
    pub fn games(&self) -> u32 {
        self.record.games()
    }

    /// Builds the showdown from member lists already resolved by the caller.
    /// When both lists are the same league each unordered pair counts once.
    pub fn compute(
        graph: &MatchupGraph,
        window: &AnalysisWindow,
        first: (&str, &[TeamId]),
        second: (&str, &[TeamId]),
    ) -> Self {
        let same_league = first.1 == second.1;
        let mut record = Record::default();
        let mut first_points = 0i64;
        let mut second_points = 0i64;
        let mut series = Vec::new();
        // (season, week, first side's outcome)
        let mut timeline: Vec<((Season, u32), Outcome)> = Vec::new();

        for (i, team) in first.1.iter().enumerate() {
            for (j, opponent) in second.1.iter().enumerate() {
                if team == opponent || (same_league && j <= i) {
                    continue;
                }
                let mut pair = Record::default();
                for game in counted(graph, window, team, opponent) {
                    let Some(view) = game.perspective(team) else {
                        continue;
                    };
                    let (Some(own), Some(theirs)) = (view.own_points, view.opponent_points) else {
                        continue;
                    };
                    let outcome = Outcome::from_margin(own - theirs);
                    pair.add(outcome);
                    record.add(outcome);
                    first_points += own as i64;
                    second_points += theirs as i64;
                    timeline.push((game.chronological_key(), outcome));
                }
                if pair.games() > 0 {
                    series.push(PairSeries {
                        team: team.clone(),
                        opponent: opponent.clone(),
                        record: pair,
                    });
                }
            }
        }

        timeline.sort_by_key(|(key, _)| *key);
        let (first_longest_streak, second_longest_streak) = longest_streaks(&timeline);
        series.sort_by(|a, b| b.record.games().cmp(&a.record.games()));

        Self {
            first: first.0.to_string(),
            second: second.0.to_string(),
            record,
            first_points,
            second_points,
            first_longest_streak,
            second_longest_streak,
            series,
        }
    }
}

/// Longest unbroken run of wins for each side; a tie ends both runs
fn longest_streaks(timeline: &[((Season, u32), Outcome)]) -> (u32, u32) {
    let (mut first, mut second) = (0u32, 0u32);
    let (mut best_first, mut best_second) = (0u32, 0u32);
    for (_, outcome) in timeline {
        match outcome {
            Outcome::Win => {
                first += 1;
                second = 0;
            }
            Outcome::Loss => {
                second += 1;
                first = 0;
            }
            Outcome::Tie => {
                first = 0;
                second = 0;
            }
        }
        best_first = best_first.max(first);
        best_second = best_second.max(second);
    }
    (best_first, best_second)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberLine {
    pub team: TeamId,
    pub record: Record,
    pub point_diff: i64,
}

/// Every member's record against all opponents inside the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConferenceReport {
    pub conference: String,
    /// Best win percentage first
    pub members: Vec<MemberLine>,
    pub combined: Record,
}

impl ConferenceReport {
    pub fn compute(
        graph: &MatchupGraph,
        window: &AnalysisWindow,
        conference: &str,
        members: &[TeamId],
    ) -> Self {
        let mut lines = Vec::new();
        let mut combined = Record::default();

        for team in members {
            let mut line = MemberLine {
                team: team.clone(),
                record: Record::default(),
                point_diff: 0,
            };
            for opponent in graph.neighbors(team) {
                for game in counted(graph, window, team, opponent) {
                    if let Some(margin) = game.perspective(team).and_then(|view| view.margin()) {
                        line.record.add(Outcome::from_margin(margin));
                        line.point_diff += margin as i64;
                    }
                }
            }
            combined.wins += line.record.wins;
            combined.losses += line.record.losses;
            combined.ties += line.record.ties;
            lines.push(line);
        }

        lines.sort_by(|a, b| b.record.win_pct().total_cmp(&a.record.win_pct()));
        Self {
            conference: conference.to_string(),
            members: lines,
            combined,
        }
    }
}
