//! Client for the external credential/league store.
//!
//! The store owns league records and upstream credentials; the gateway only
//! reads them and issues single idempotent writes (season add, team patch).

mod client;
mod models;

pub use client::HttpLeagueStore;
pub use models::{NewSeasonRecord, Sport, StoredLeague, UpstreamCredentials};

use async_trait::async_trait;
use thiserror::Error;

/// Failure modes of a store call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the forwarded session token.
    #[error("league store rejected the session token")]
    AuthRejected,
    #[error("league store request timed out")]
    TimedOut,
    #[error("league store request failed: {0}")]
    Transport(String),
    #[error("league store returned unexpected status {0}")]
    Status(u16),
    #[error("malformed league store response: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Timeouts and transport hiccups are worth a single retry on
    /// idempotent calls; everything else is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::TimedOut | StoreError::Transport(_))
    }
}

/// Outcome of the idempotent season-add call. Conflict and limit responses
/// are expected domain outcomes, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddSeasonOutcome {
    Added,
    AlreadyExists,
    LimitExceeded,
}

/// Read/write access to an identity's stored leagues and credentials.
///
/// Every call carries the verified subject and, where available, the original
/// bearer token so the store can verify the caller independently.
#[async_trait]
pub trait LeagueStore: Send + Sync {
    async fn leagues(
        &self,
        subject: &str,
        bearer: Option<&str>,
    ) -> Result<Vec<StoredLeague>, StoreError>;

    async fn credentials(
        &self,
        subject: &str,
        bearer: Option<&str>,
    ) -> Result<UpstreamCredentials, StoreError>;

    async fn add_season(
        &self,
        subject: &str,
        bearer: Option<&str>,
        record: &NewSeasonRecord,
    ) -> Result<AddSeasonOutcome, StoreError>;

    async fn set_league_team(
        &self,
        subject: &str,
        bearer: Option<&str>,
        league_id: &str,
        season_year: i32,
        team_id: i64,
    ) -> Result<(), StoreError>;
}
