//! Typed shapes for upstream provider responses.
//!
//! Upstream payloads are narrowed into these records at the client boundary;
//! nothing downstream handles loosely-typed maps.

use serde::{Deserialize, Serialize};

/// Basic league info for one season, including the team list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueInfo {
    #[serde(alias = "id")]
    pub league_id: String,
    pub name: String,
    pub season_year: i32,
    #[serde(default)]
    pub current_week: Option<u32>,
    #[serde(default)]
    pub teams: Vec<TeamEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub abbrev: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingEntry {
    pub team_id: i64,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub points_for: f64,
    #[serde(default)]
    pub points_against: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    pub team_id: i64,
    pub team_name: String,
    pub slots: Vec<RosterSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSlot {
    pub player: String,
    pub position: String,
    pub slot: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matchup {
    pub week: u32,
    pub home_team_id: i64,
    pub home_team_name: String,
    pub home_score: f64,
    pub away_team_id: i64,
    pub away_team_name: String,
    pub away_score: f64,
}
