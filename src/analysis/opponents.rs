//! Opponent profile for one team

use crate::error::Result;
use crate::graph::MatchupGraph;
use crate::source::ConferenceLineage;
use crate::types::{GameRecord, Season, TeamId};
use serde::Serialize;

/// Matchups need at least this many scored games to rank as dominant or tough
pub const MIN_MATCHUP_GAMES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentLine {
    pub opponent: TeamId,
    /// Scored games counted for this line
    pub games: u32,
    pub total_diff: i64,
    pub last_met: Season,
}

impl OpponentLine {
    pub fn avg_diff(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_diff as f64 / self.games as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentProfile {
    pub team: TeamId,
    pub non_conference_only: bool,
    /// Most games first; ties keep neighbor order
    pub opponents: Vec<OpponentLine>,
}

impl OpponentProfile {
    pub fn most_played(&self, limit: usize) -> &[OpponentLine] {
        &self.opponents[..limit.min(self.opponents.len())]
    }

    fn significant(&self) -> Vec<&OpponentLine> {
        self.opponents
            .iter()
            .filter(|line| line.games >= MIN_MATCHUP_GAMES)
            .collect()
    }

    /// Best average margin first
    pub fn dominant(&self, limit: usize) -> Vec<&OpponentLine> {
        let mut lines = self.significant();
        lines.sort_by(|a, b| b.avg_diff().total_cmp(&a.avg_diff()));
        lines.truncate(limit);
        lines
    }

    /// Worst average margin first
    pub fn toughest(&self, limit: usize) -> Vec<&OpponentLine> {
        let mut lines = self.significant();
        lines.sort_by(|a, b| a.avg_diff().total_cmp(&b.avg_diff()));
        lines.truncate(limit);
        lines
    }
}

fn same_conference(game: &GameRecord, lineage: &dyn ConferenceLineage) -> bool {
    if game.conference_game {
        return true;
    }
    match (&game.home_conference, &game.away_conference) {
        (Some(home), Some(away)) => {
            lineage.resolve(home, Some(game.season)) == lineage.resolve(away, Some(game.season))
        }
        _ => false,
    }
}

/// Per-opponent margins for `team`, optionally skipping conference games.
/// Opponents with no scored game left after filtering are omitted.
pub fn opponent_profile(
    graph: &MatchupGraph,
    team: &str,
    non_conference_only: bool,
    lineage: &dyn ConferenceLineage,
) -> Result<OpponentProfile> {
    let team = graph.require_team(team)?;
    let mut opponents = Vec::new();

    for opponent in graph.neighbors(team) {
        let Some(edge) = graph.edge(team, opponent) else {
            continue;
        };
        let mut line = OpponentLine {
            opponent: opponent.to_string(),
            games: 0,
            total_diff: 0,
            last_met: edge.last_met(),
        };
        for game in edge.history() {
            if non_conference_only && same_conference(game, lineage) {
                continue;
            }
            if let Some(margin) = game.perspective(team).and_then(|view| view.margin()) {
                line.games += 1;
                line.total_diff += margin as i64;
            }
        }
        if line.games > 0 {
            opponents.push(line);
        }
    }

    opponents.sort_by(|a, b| b.games.cmp(&a.games));
    Ok(OpponentProfile {
        team: team.to_string(),
        non_conference_only,
        opponents,
    })
}
