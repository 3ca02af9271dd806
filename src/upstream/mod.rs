//! Read-only client for the upstream fantasy-data provider.

mod client;
mod models;

pub use client::HttpFantasyProvider;
pub use models::{LeagueInfo, Matchup, RosterSlot, StandingEntry, TeamEntry, TeamRoster};

use async_trait::async_trait;
use thiserror::Error;

use crate::league_store::{Sport, UpstreamCredentials};

/// Failure modes of an upstream fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The league or season does not exist upstream.
    #[error("league or season not found upstream")]
    NotFound,
    /// Upstream signalled rate limiting. Never retried.
    #[error("upstream rate limit hit")]
    RateLimited,
    /// Upstream rejected the stored credentials (explicit 401/403, or a
    /// markup body where JSON was expected).
    #[error("upstream rejected the stored credentials")]
    AuthRejected,
    #[error("upstream request timed out")]
    TimedOut,
    #[error("transient upstream failure: {0}")]
    Transient(String),
    #[error("malformed upstream payload: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Whether a single delayed retry is worthwhile.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::TimedOut | FetchError::Transient(_))
    }
}

/// Per-sport read-only endpoints of the fantasy-data provider.
#[async_trait]
pub trait FantasyProvider: Send + Sync {
    /// Basic league info (name, season, teams) for one season.
    async fn league_info(
        &self,
        credentials: &UpstreamCredentials,
        sport: Sport,
        league_id: &str,
        season_year: i32,
    ) -> Result<LeagueInfo, FetchError>;

    async fn standings(
        &self,
        credentials: &UpstreamCredentials,
        sport: Sport,
        league_id: &str,
        season_year: i32,
    ) -> Result<Vec<StandingEntry>, FetchError>;

    async fn roster(
        &self,
        credentials: &UpstreamCredentials,
        sport: Sport,
        league_id: &str,
        season_year: i32,
        team_id: i64,
    ) -> Result<TeamRoster, FetchError>;

    async fn matchups(
        &self,
        credentials: &UpstreamCredentials,
        sport: Sport,
        league_id: &str,
        season_year: i32,
        week: Option<u32>,
    ) -> Result<Vec<Matchup>, FetchError>;
}
