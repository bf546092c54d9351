//! Head-to-head breakdown for a single pair of teams

use crate::error::Result;
use crate::graph::MatchupGraph;
use crate::types::{GameRecord, Outcome, Record, Season, TeamId};
use serde::Serialize;
use std::fmt;

/// The most recently listed game of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastMeeting {
    pub season: Season,
    /// `None` for a tie or an unscored game
    pub winner: Option<TeamId>,
    /// Winner's score first; `None` when unscored
    pub score: Option<(i32, i32)>,
}

impl LastMeeting {
    fn from_game(game: &GameRecord) -> Self {
        let (winner, score) = match (game.home_points, game.away_points) {
            (Some(home), Some(away)) if home > away => (Some(game.home_team.clone()), Some((home, away))),
            (Some(home), Some(away)) if away > home => (Some(game.away_team.clone()), Some((away, home))),
            (Some(home), Some(away)) => (None, Some((home, away))),
            _ => (None, None),
        };
        Self {
            season: game.season,
            winner,
            score,
        }
    }
}

impl fmt::Display for LastMeeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.winner, self.score) {
            (Some(winner), Some((w, l))) => write!(f, "{} ({} won {}-{})", self.season, winner, w, l),
            (None, Some((a, b))) => write!(f, "{} (Tie {}-{})", self.season, a, b),
            _ => write!(f, "{} (N/A)", self.season),
        }
    }
}

/// Series between `team` and `opponent`, from `team`'s side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHead {
    pub team: TeamId,
    pub opponent: TeamId,
    pub overall: Record,
    /// Games where `team` was listed as host
    pub at_team: Record,
    /// Games where `opponent` was listed as host
    pub at_opponent: Record,
    pub points_for: i64,
    pub points_against: i64,
    pub last_meeting: Option<LastMeeting>,
}

impl HeadToHead {
    pub fn point_diff(&self) -> i64 {
        self.points_for - self.points_against
    }

    pub fn avg_points_for(&self) -> f64 {
        per_game(self.points_for, self.overall.games())
    }

    pub fn avg_points_against(&self) -> f64 {
        per_game(self.points_against, self.overall.games())
    }

    /// Team with the better cumulative differential; `None` when level
    pub fn favors(&self) -> Option<&str> {
        match self.point_diff().signum() {
            1 => Some(&self.team),
            -1 => Some(&self.opponent),
            _ => None,
        }
    }
}

fn per_game(points: i64, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        points as f64 / games as f64
    }
}

/// Breakdown of a pair's whole shared history; `None` if they never met.
/// Unscored rows only count towards the last meeting.
pub fn head_to_head(graph: &MatchupGraph, team: &str, opponent: &str) -> Result<Option<HeadToHead>> {
    let team = graph.require_team(team)?;
    let opponent = graph.require_team(opponent)?;
    let Some(edge) = graph.edge(team, opponent) else {
        return Ok(None);
    };

    let mut report = HeadToHead {
        team: team.to_string(),
        opponent: opponent.to_string(),
        overall: Record::default(),
        at_team: Record::default(),
        at_opponent: Record::default(),
        points_for: 0,
        points_against: 0,
        last_meeting: edge.history().last().map(LastMeeting::from_game),
    };

    for game in edge.history() {
        let Some(view) = game.perspective(team) else {
            continue;
        };
        let (Some(own), Some(theirs)) = (view.own_points, view.opponent_points) else {
            continue;
        };
        let outcome = Outcome::from_margin(own - theirs);
        report.overall.add(outcome);
        if view.is_home {
            report.at_team.add(outcome);
        } else {
            report.at_opponent.add(outcome);
        }
        report.points_for += own as i64;
        report.points_against += theirs as i64;
    }

    Ok(Some(report))
}
