//! Legacy REST adapter.
//!
//! A thin plain-HTTP surface over the same tool executor the JSON-RPC
//! endpoint uses, kept so pre-protocol clients keep working. There is
//! exactly one place the resolution algorithm lives; this file only maps
//! transport shapes.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::auth::RequestAuth;
use crate::discovery::{DiscoveryError, SeasonProber};
use crate::league_store::{StoreError, StoredLeague};
use crate::mcp::handler::challenge;
use crate::mcp::protocol::AuthChallenge;
use crate::resolver::ToolExecution;

use super::state::ServerState;

/// `POST /v1/tools/{name}`: invoke one tool; the body is the raw arguments
/// object.
pub async fn call_tool(
    State(state): State<ServerState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (identity, bearer) = match state
        .verifier
        .authenticate(&headers, state.config.dev_insecure_identity)
        .await
    {
        RequestAuth::Verified { identity, bearer } => (identity, bearer),
        RequestAuth::Missing => return challenge(AuthChallenge::Unauthorized, None, &state),
        RequestAuth::Rejected(err) => {
            debug!("Bearer token rejected: {}", err.reason_code());
            return challenge(AuthChallenge::InvalidToken, None, &state);
        }
    };

    let arguments: Value = if body.is_empty() {
        serde_json::json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) | Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": "body must be a JSON object"})),
                )
                    .into_response()
            }
        }
    };

    match state
        .executor
        .execute(&name, arguments, &identity, bearer.as_deref())
        .await
    {
        ToolExecution::Completed(result) => Json(result).into_response(),
        ToolExecution::Protocol(err) => {
            let status = match err.code() {
                -32601 => StatusCode::NOT_FOUND,
                -32602 => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(serde_json::json!({"error": err.message()}))).into_response()
        }
        ToolExecution::AuthInvalid => challenge(AuthChallenge::InvalidToken, None, &state),
    }
}

#[derive(Debug, Deserialize, Default)]
struct DiscoverSeasonsBody {
    #[serde(default)]
    team_id: Option<i64>,
}

/// `POST /v1/leagues/{league_id}/discover-seasons`: onboarding entry point
/// for the season prober.
pub async fn discover_seasons(
    State(state): State<ServerState>,
    Path(league_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (identity, bearer) = match state
        .verifier
        .authenticate(&headers, state.config.dev_insecure_identity)
        .await
    {
        RequestAuth::Verified { identity, bearer } => (identity, bearer),
        RequestAuth::Missing => return challenge(AuthChallenge::Unauthorized, None, &state),
        RequestAuth::Rejected(err) => {
            debug!("Bearer token rejected: {}", err.reason_code());
            return challenge(AuthChallenge::InvalidToken, None, &state);
        }
    };

    let body: DiscoverSeasonsBody = if body.is_empty() {
        DiscoverSeasonsBody::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(body) => body,
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": format!("invalid body: {}", err)})),
                )
                    .into_response()
            }
        }
    };

    let leagues = match state.store.leagues(&identity.subject, bearer.as_deref()).await {
        Ok(leagues) => leagues,
        Err(StoreError::AuthRejected) => {
            return challenge(AuthChallenge::InvalidToken, None, &state)
        }
        Err(err) => {
            return (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": err.to_string()})),
            )
                .into_response()
        }
    };

    let league = match base_record(&leagues, &league_id) {
        Some(league) => league.clone(),
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": format!("league {} is not linked", league_id)})),
            )
                .into_response()
        }
    };

    let base_team_id = match body.team_id.or(league.team_id) {
        Some(id) => id,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "team_id is required when the league has no selected team"
                })),
            )
                .into_response()
        }
    };

    let credentials = match state
        .store
        .credentials(&identity.subject, bearer.as_deref())
        .await
    {
        Ok(credentials) => credentials,
        Err(StoreError::AuthRejected) => {
            return challenge(AuthChallenge::InvalidToken, None, &state)
        }
        Err(err) => {
            return (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": err.to_string()})),
            )
                .into_response()
        }
    };

    let prober = SeasonProber::new(
        state.store.clone(),
        state.provider.clone(),
        state.discovery.clone(),
    );

    match prober
        .discover(
            &league,
            base_team_id,
            &identity.subject,
            bearer.as_deref(),
            &credentials,
        )
        .await
    {
        Ok(report) => Json(report).into_response(),
        Err(DiscoveryError::CredentialsRejected)
        | Err(DiscoveryError::Store(StoreError::AuthRejected)) => {
            challenge(AuthChallenge::InvalidToken, None, &state)
        }
        Err(DiscoveryError::Store(err)) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

/// The record the prober starts from: prefer one with a selected team.
fn base_record<'a>(leagues: &'a [StoredLeague], league_id: &str) -> Option<&'a StoredLeague> {
    let mut records = leagues.iter().filter(|l| l.league_id == league_id);
    let first = records.next()?;
    Some(
        std::iter::once(first)
            .chain(records)
            .find(|l| l.team_id.is_some())
            .unwrap_or(first),
    )
}
