//! League resolution and tool execution.
//!
//! Exactly one place owns the resolution algorithm: both the JSON-RPC
//! dispatcher and the legacy REST adapter delegate here. For each call the
//! executor loads the identity's stored leagues, filters them to the tool's
//! sport, picks a default, normalizes the caller's arguments, and runs the
//! tool handler with the resolved context.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::auth::VerifiedIdentity;
use crate::discovery::DiscoverySettings;
use crate::league_store::{LeagueStore, Sport, StoreError, StoredLeague};
use crate::mcp::context::{ResolvedTarget, ToolContext, ToolError};
use crate::mcp::protocol::{RpcError, ToolsCallResult};
use crate::mcp::registry::ToolRegistry;
use crate::upstream::FantasyProvider;

/// Outcome of one tool invocation.
pub enum ToolExecution {
    /// The tool ran; runtime failures are inside the result as `isError`.
    Completed(ToolsCallResult),
    /// The invocation itself was invalid (unknown tool).
    Protocol(RpcError),
    /// The store or upstream reported the session is no longer valid; the
    /// transport layer escalates to the `invalid_token` challenge.
    AuthInvalid,
}

/// Executes tools against resolved league context.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    store: Arc<dyn LeagueStore>,
    provider: Arc<dyn FantasyProvider>,
    discovery: DiscoverySettings,
}

impl ToolExecutor {
    pub fn new(
        registry: Arc<ToolRegistry>,
        store: Arc<dyn LeagueStore>,
        provider: Arc<dyn FantasyProvider>,
        discovery: DiscoverySettings,
    ) -> Self {
        Self {
            registry,
            store,
            provider,
            discovery,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn execute(
        &self,
        tool_name: &str,
        raw_args: Value,
        identity: &VerifiedIdentity,
        bearer: Option<&str>,
    ) -> ToolExecution {
        let tool = match self.registry.get_tool(tool_name) {
            Some(tool) => tool,
            None => {
                return ToolExecution::Protocol(RpcError::MethodNotFound(format!(
                    "Unknown tool: {}",
                    tool_name
                )))
            }
        };

        let all_leagues = match self.store.leagues(&identity.subject, bearer).await {
            Ok(leagues) => leagues,
            Err(StoreError::AuthRejected) => return ToolExecution::AuthInvalid,
            Err(err) => {
                return ToolExecution::Completed(ToolsCallResult::error(format!(
                    "Could not load stored leagues: {}",
                    err
                )))
            }
        };

        // Sport synonyms (game codes, pro-league abbreviations) are folded
        // into the typed Sport at the store boundary, so the filter here is
        // a plain equality.
        let matching_leagues: Vec<StoredLeague> = all_leagues
            .iter()
            .filter(|l| l.sport == tool.sport)
            .cloned()
            .collect();

        let mut context = ToolContext {
            identity: identity.clone(),
            bearer: bearer.map(str::to_string),
            sport: tool.sport,
            all_leagues,
            matching_leagues,
            target: None,
            credentials: None,
            store: self.store.clone(),
            provider: self.provider.clone(),
            discovery: self.discovery.clone(),
        };

        if tool.requires_league {
            if context.matching_leagues.is_empty() {
                return ToolExecution::Completed(no_league_error(&context));
            }

            let target = resolve_target(&context.matching_leagues, tool.sport, &raw_args);
            context.target = Some(target);

            let credentials = match self.store.credentials(&identity.subject, bearer).await {
                Ok(credentials) => credentials,
                Err(StoreError::AuthRejected) => return ToolExecution::AuthInvalid,
                Err(err) => {
                    return ToolExecution::Completed(ToolsCallResult::error(format!(
                        "Could not load stored credentials: {}",
                        err
                    )))
                }
            };
            context.credentials = Some(credentials);
        }

        match (tool.handler)(context, raw_args).await {
            Ok(result) => ToolExecution::Completed(result),
            Err(ToolError::AuthInvalid) => ToolExecution::AuthInvalid,
            Err(ToolError::Failed(message)) => {
                ToolExecution::Completed(ToolsCallResult::error(message))
            }
        }
    }
}

/// Tool-level error result for a sport with no linked leagues, naming what
/// the identity does have.
fn no_league_error(context: &ToolContext) -> ToolsCallResult {
    if context.all_leagues.is_empty() {
        ToolsCallResult::error(format!(
            "No leagues are linked to this account. The user needs to link a \
             {} league before this tool can be used.",
            context.sport
        ))
    } else {
        let mut other_sports: Vec<String> = context
            .all_leagues
            .iter()
            .map(|l| l.sport.to_string())
            .collect();
        other_sports.sort();
        other_sports.dedup();
        ToolsCallResult::error(format!(
            "No {} leagues are linked to this account; found leagues for: {}.",
            context.sport,
            other_sports.join(", ")
        ))
    }
}

/// Pick the league and season a call should target.
///
/// A caller-supplied `league_id` that does not belong to the identity's
/// resolved set is overridden with the default rather than trusted.
fn resolve_target(matching: &[StoredLeague], sport: Sport, args: &Value) -> ResolvedTarget {
    let requested_league = arg_league_id(args);
    let requested_season = arg_season_id(args);

    let league = match &requested_league {
        Some(id) if matching.iter().any(|l| &l.league_id == id) => {
            let records: Vec<StoredLeague> = matching
                .iter()
                .filter(|l| &l.league_id == id)
                .cloned()
                .collect();
            choose_default(&records, sport)
        }
        Some(id) => {
            let fallback = choose_default(matching, sport);
            debug!(
                "Requested league {} is not in the resolved set; using {} instead",
                id, fallback.league_id
            );
            fallback
        }
        None => choose_default(matching, sport),
    };

    let season_year = requested_season.unwrap_or_else(|| {
        if league.season_year > 0 {
            league.season_year
        } else {
            sport.current_season(chrono::Utc::now().date_naive())
        }
    });

    ResolvedTarget {
        league,
        season_year,
    }
}

/// Default-league precedence: current season with a team selected, then any
/// league with a team selected, then the first match. The store's default
/// flag breaks ties within each class.
fn choose_default(leagues: &[StoredLeague], sport: Sport) -> StoredLeague {
    let current = sport.current_season(chrono::Utc::now().date_naive());

    let pick = |candidates: Vec<&StoredLeague>| -> Option<StoredLeague> {
        candidates
            .iter()
            .find(|l| l.is_default.unwrap_or(false))
            .or_else(|| candidates.first())
            .map(|l| (*l).clone())
    };

    pick(leagues
        .iter()
        .filter(|l| l.season_year == current && l.team_id.is_some())
        .collect())
    .or_else(|| pick(leagues.iter().filter(|l| l.team_id.is_some()).collect()))
    .or_else(|| pick(leagues.iter().collect()))
    .unwrap_or_else(|| leagues[0].clone())
}

fn arg_league_id(args: &Value) -> Option<String> {
    match args.get("league_id") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn arg_season_id(args: &Value) -> Option<i32> {
    match args.get("season_id") {
        Some(Value::Number(n)) => n.as_i64().map(|v| v as i32),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
