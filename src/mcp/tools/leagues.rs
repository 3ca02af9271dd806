//! League Tools
//!
//! Read-only tools over the resolved league: info, standings, rosters,
//! matchups, and the season-discovery entry point.

use serde::Deserialize;
use serde_json::Value;

use crate::discovery::{DiscoveryError, SeasonProber};
use crate::mcp::context::{ToolContext, ToolError};
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{RegisteredTool, ToolBuilder, ToolRegistry, ToolResult};

/// Register league tools with the registry
pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register_tool(info_tool());
    registry.register_tool(standings_tool());
    registry.register_tool(roster_tool());
    registry.register_tool(matchups_tool());
    registry.register_tool(discover_seasons_tool());
}

/// Common schema fragment: every league tool accepts these two overrides.
fn league_properties() -> Value {
    serde_json::json!({
        "league_id": {
            "type": "string",
            "description": "League to target; defaults to the user's default league"
        },
        "season_id": {
            "type": "integer",
            "description": "Season year; defaults to the league's stored season"
        }
    })
}

fn bad_params(err: serde_json::Error) -> ToolError {
    ToolError::Failed(format!("invalid arguments: {}", err))
}

fn internal(err: serde_json::Error) -> ToolError {
    ToolError::Failed(format!("failed to encode result: {}", err))
}

// ============================================================================
// league.info
// ============================================================================

fn info_tool() -> RegisteredTool {
    ToolBuilder::new("league.info")
        .description("Get basic info for a fantasy football league: name, season, and teams")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": league_properties(),
        }))
        .build(info_handler)
}

async fn info_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    let target = ctx.target()?;
    let credentials = ctx.credentials()?;

    let info = ctx
        .provider
        .league_info(
            credentials,
            target.league.sport,
            &target.league.league_id,
            target.season_year,
        )
        .await?;

    let result = serde_json::json!({
        "league": {
            "id": info.league_id,
            "name": info.name,
            "season": info.season_year,
            "current_week": info.current_week,
        },
        "teams": info.teams.iter().map(|t| serde_json::json!({
            "id": t.id,
            "name": t.name,
            "abbrev": t.abbrev,
            "owner": t.owner,
        })).collect::<Vec<_>>(),
        "team_count": info.teams.len(),
    });

    ToolsCallResult::json(&result).map_err(internal)
}

// ============================================================================
// league.standings
// ============================================================================

fn standings_tool() -> RegisteredTool {
    ToolBuilder::new("league.standings")
        .description("Get the standings of a fantasy football league")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": league_properties(),
        }))
        .build(standings_handler)
}

async fn standings_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    let target = ctx.target()?;
    let credentials = ctx.credentials()?;

    let standings = ctx
        .provider
        .standings(
            credentials,
            target.league.sport,
            &target.league.league_id,
            target.season_year,
        )
        .await?;

    let result = serde_json::json!({
        "season": target.season_year,
        "standings": standings.iter().map(|s| serde_json::json!({
            "team_id": s.team_id,
            "team": s.team_name,
            "record": format!("{}-{}-{}", s.wins, s.losses, s.ties),
            "points_for": s.points_for,
            "points_against": s.points_against,
        })).collect::<Vec<_>>(),
    });

    ToolsCallResult::json(&result).map_err(internal)
}

// ============================================================================
// team.roster
// ============================================================================

#[derive(Debug, Deserialize)]
struct RosterParams {
    #[serde(default)]
    team_id: Option<i64>,
}

fn roster_tool() -> RegisteredTool {
    let mut properties = league_properties();
    properties["team_id"] = serde_json::json!({
        "type": "integer",
        "description": "Team to read; defaults to the user's selected team"
    });
    ToolBuilder::new("team.roster")
        .description("Get the roster of a team in a fantasy football league")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": properties,
        }))
        .build(roster_handler)
}

async fn roster_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: RosterParams = serde_json::from_value(params).map_err(bad_params)?;
    let target = ctx.target()?;
    let credentials = ctx.credentials()?;

    let team_id = match params.team_id.or(target.league.team_id) {
        Some(id) => id,
        None => {
            return Err(ToolError::Failed(
                "No team selected for this league and no team_id argument given. \
                 Ask the user which team is theirs."
                    .to_string(),
            ))
        }
    };

    let roster = ctx
        .provider
        .roster(
            credentials,
            target.league.sport,
            &target.league.league_id,
            target.season_year,
            team_id,
        )
        .await?;

    let result = serde_json::json!({
        "team": { "id": roster.team_id, "name": roster.team_name },
        "season": target.season_year,
        "slots": roster.slots.iter().map(|s| serde_json::json!({
            "player": s.player,
            "position": s.position,
            "slot": s.slot,
            "status": s.status,
        })).collect::<Vec<_>>(),
    });

    ToolsCallResult::json(&result).map_err(internal)
}

// ============================================================================
// league.matchups
// ============================================================================

#[derive(Debug, Deserialize)]
struct MatchupsParams {
    #[serde(default)]
    week: Option<u32>,
}

fn matchups_tool() -> RegisteredTool {
    let mut properties = league_properties();
    properties["week"] = serde_json::json!({
        "type": "integer",
        "description": "Week to read; defaults to the current scoring period",
        "minimum": 1
    });
    ToolBuilder::new("league.matchups")
        .description("Get weekly matchups and scores for a fantasy football league")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": properties,
        }))
        .build(matchups_handler)
}

async fn matchups_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: MatchupsParams = serde_json::from_value(params).map_err(bad_params)?;
    let target = ctx.target()?;
    let credentials = ctx.credentials()?;

    let matchups = ctx
        .provider
        .matchups(
            credentials,
            target.league.sport,
            &target.league.league_id,
            target.season_year,
            params.week,
        )
        .await?;

    let result = serde_json::json!({
        "season": target.season_year,
        "matchups": matchups.iter().map(|m| serde_json::json!({
            "week": m.week,
            "home": { "team_id": m.home_team_id, "team": m.home_team_name, "score": m.home_score },
            "away": { "team_id": m.away_team_id, "team": m.away_team_name, "score": m.away_score },
        })).collect::<Vec<_>>(),
    });

    ToolsCallResult::json(&result).map_err(internal)
}

// ============================================================================
// league.discover_seasons
// ============================================================================

#[derive(Debug, Deserialize)]
struct DiscoverParams {
    #[serde(default)]
    team_id: Option<i64>,
}

fn discover_seasons_tool() -> RegisteredTool {
    let mut properties = league_properties();
    properties["team_id"] = serde_json::json!({
        "type": "integer",
        "description": "The user's team in the league; defaults to the selected team"
    });
    ToolBuilder::new("league.discover_seasons")
        .description(
            "Probe the upstream provider for the league's historical seasons \
             and store every season that exists. Long-running; intended for \
             onboarding, not per-question use.",
        )
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": properties,
        }))
        .build(discover_seasons_handler)
}

async fn discover_seasons_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DiscoverParams = serde_json::from_value(params).map_err(bad_params)?;
    let target = ctx.target()?.clone();
    let credentials = ctx.credentials()?.clone();

    let base_team_id = match params.team_id.or(target.league.team_id) {
        Some(id) => id,
        None => {
            return Err(ToolError::Failed(
                "Season discovery needs the user's team: select a team for \
                 this league or pass a team_id argument."
                    .to_string(),
            ))
        }
    };

    let prober = SeasonProber::new(
        ctx.store.clone(),
        ctx.provider.clone(),
        ctx.discovery.clone(),
    );

    let report = prober
        .discover(
            &target.league,
            base_team_id,
            &ctx.identity.subject,
            ctx.bearer.as_deref(),
            &credentials,
        )
        .await
        .map_err(|err| match err {
            DiscoveryError::CredentialsRejected => ToolError::AuthInvalid,
            DiscoveryError::Store(crate::league_store::StoreError::AuthRejected) => {
                ToolError::AuthInvalid
            }
            DiscoveryError::Store(store_err) => ToolError::Failed(store_err.to_string()),
        })?;

    ToolsCallResult::json(&report).map_err(internal)
}
