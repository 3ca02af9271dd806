//! Tool execution context.
//!
//! Built by the resolver for each `tools/call` and handed to the tool
//! handler together with the raw arguments.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::VerifiedIdentity;
use crate::discovery::DiscoverySettings;
use crate::league_store::{LeagueStore, Sport, StoredLeague, UpstreamCredentials};
use crate::upstream::{FantasyProvider, FetchError};

/// The league and season a tool call was resolved to.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub league: StoredLeague,
    pub season_year: i32,
}

/// Context provided to tool handlers during execution.
#[derive(Clone)]
pub struct ToolContext {
    /// The verified caller.
    pub identity: VerifiedIdentity,

    /// Original bearer token, forwarded to the store where available.
    pub bearer: Option<String>,

    /// The sport family of the invoked tool.
    pub sport: Sport,

    /// Every league the store returned for the identity.
    pub all_leagues: Vec<StoredLeague>,

    /// The sport-filtered subset.
    pub matching_leagues: Vec<StoredLeague>,

    /// Resolved league/season; present for every tool that requires one.
    pub target: Option<ResolvedTarget>,

    /// Upstream credentials; present for every tool that requires a league.
    pub credentials: Option<UpstreamCredentials>,

    pub store: Arc<dyn LeagueStore>,
    pub provider: Arc<dyn FantasyProvider>,
    pub discovery: DiscoverySettings,
}

impl ToolContext {
    /// The resolved target, for tools the resolver guarantees one for.
    pub fn target(&self) -> Result<&ResolvedTarget, ToolError> {
        self.target
            .as_ref()
            .ok_or_else(|| ToolError::Failed("no league resolved for this call".to_string()))
    }

    pub fn credentials(&self) -> Result<&UpstreamCredentials, ToolError> {
        self.credentials
            .as_ref()
            .ok_or_else(|| ToolError::Failed("no credentials resolved for this call".to_string()))
    }
}

/// Failure of a tool handler.
///
/// `Failed` becomes an `isError` tool result the calling AI can read;
/// `AuthInvalid` escalates to the HTTP 401 `invalid_token` challenge.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("session is no longer valid")]
    AuthInvalid,
    #[error("{0}")]
    Failed(String),
}

impl From<FetchError> for ToolError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::AuthRejected => ToolError::AuthInvalid,
            other => ToolError::Failed(other.to_string()),
        }
    }
}
