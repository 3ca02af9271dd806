//! Session Tool
//!
//! `session.describe` always succeeds for an authenticated identity, even
//! with zero linked leagues; its job is to tell the calling AI what context
//! it has and how to disambiguate when there is more than one choice.

use serde_json::Value;

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{ToolBuilder, ToolRegistry, ToolResult};

/// Register session tools with the registry
pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register_tool(describe_tool());
}

fn describe_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("session.describe")
        .description(
            "Describe the authenticated session: which leagues are linked, \
             which one is the default, and whether the user must be asked \
             to disambiguate",
        )
        .no_league_required()
        .build(describe_handler)
}

async fn describe_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    let sport = ctx.sport;

    if ctx.matching_leagues.is_empty() {
        let text = if ctx.all_leagues.is_empty() {
            format!(
                "Subject {} is authenticated but has no linked leagues yet. \
                 The user needs to link a league before {} tools can be used.",
                ctx.identity.subject, sport
            )
        } else {
            let mut other_sports: Vec<String> = ctx
                .all_leagues
                .iter()
                .map(|l| l.sport.to_string())
                .collect();
            other_sports.sort();
            other_sports.dedup();
            format!(
                "No {} leagues are linked for subject {}; found leagues for: {}.",
                sport,
                ctx.identity.subject,
                other_sports.join(", ")
            )
        };
        return Ok(ToolsCallResult::text(text));
    }

    if ctx.matching_leagues.len() == 1 {
        let league = &ctx.matching_leagues[0];
        let team = match (&league.team_name, league.team_id) {
            (Some(name), _) => format!("team \"{}\"", name),
            (None, Some(id)) => format!("team id {}", id),
            (None, None) => "no team selected".to_string(),
        };
        return Ok(ToolsCallResult::text(format!(
            "Subject {} has one {} league: {}, {}. It is used as the default \
             for every {} tool call.",
            ctx.identity.subject,
            sport,
            league.label(),
            team,
            sport
        )));
    }

    // Multiple leagues/seasons: the calling AI must ask the user which one
    // to use rather than guessing.
    let mut lines = vec![format!(
        "Subject {} has {} {} leagues. Ask the user which one to use and pass \
         its league_id (and season_id where it matters) explicitly:",
        ctx.identity.subject,
        ctx.matching_leagues.len(),
        sport
    )];
    for league in &ctx.matching_leagues {
        lines.push(format!("- {}", league.label()));
    }
    Ok(ToolsCallResult::text(lines.join("\n")))
}
