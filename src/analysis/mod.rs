//! Descriptive reports over the matchup graph
//!
//! Unlike the rating engine these are single-pass summaries: a pair's
//! head-to-head history, league-wide rivalries, one team's opponents and
//! conference-versus-conference records.

pub mod conference;
pub mod head_to_head;
pub mod opponents;
pub mod rivalries;

pub use conference::{conference_members, ConferenceReport, ConferenceShowdown, MemberLine, PairSeries};
pub use head_to_head::{head_to_head, HeadToHead, LastMeeting};
pub use opponents::{opponent_profile, OpponentLine, OpponentProfile, MIN_MATCHUP_GAMES};
pub use rivalries::{rivalries, rivalry_report, Rivalry, RivalryReport, ONE_SIDED_MIN_GAMES};
