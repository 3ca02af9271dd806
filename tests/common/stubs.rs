//! Stub store and upstream services for end-to-end tests
//!
//! Both run as real axum servers on random ports so the gateway's actual
//! HTTP clients (status classification included) are exercised.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use fantasy_gateway::league_store::StoredLeague;
use serde_json::json;

// ============================================================================
// Stub credential/league store
// ============================================================================

#[derive(Default)]
pub struct StubStoreOptions {
    pub leagues: Vec<StoredLeague>,
    /// Status for the leagues endpoint; 0 means 200
    pub leagues_status: u16,
    /// Status for the credentials endpoint; 0 means 200
    pub credentials_status: u16,
    /// Season years answered with 409 on add
    pub conflict_years: Vec<i32>,
    /// Seasons accepted before the store reports its league limit
    pub limit: Option<usize>,
}

pub struct StubStoreState {
    options: StubStoreOptions,
    pub added_years: Mutex<Vec<i32>>,
    pub patched: Mutex<Vec<(String, i32, i64)>>,
    pub bearer_seen: Mutex<Option<String>>,
}

/// Running stub store
pub struct StubStore {
    pub base_url: String,
    pub state: Arc<StubStoreState>,
    _shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl StubStore {
    pub async fn spawn(options: StubStoreOptions) -> Self {
        let state = Arc::new(StubStoreState {
            options,
            added_years: Mutex::new(vec![]),
            patched: Mutex::new(vec![]),
            bearer_seen: Mutex::new(None),
        });

        let app = Router::new()
            .route("/identities/{subject}/leagues", get(get_leagues).post(add_season))
            .route("/identities/{subject}/credentials", get(get_credentials))
            .route(
                "/identities/{subject}/leagues/{league_id}/seasons/{season}",
                axum::routing::patch(patch_team),
            )
            .with_state(state.clone());

        let (base_url, shutdown_tx) = serve(app).await;

        Self {
            base_url,
            state,
            _shutdown_tx: shutdown_tx,
        }
    }

    pub fn added_years(&self) -> Vec<i32> {
        self.state.added_years.lock().unwrap().clone()
    }

    pub fn patched(&self) -> Vec<(String, i32, i64)> {
        self.state.patched.lock().unwrap().clone()
    }
}

async fn get_leagues(
    State(state): State<Arc<StubStoreState>>,
    headers: axum::http::HeaderMap,
    Path(_subject): Path<String>,
) -> Response {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        *state.bearer_seen.lock().unwrap() = Some(auth.to_string());
    }
    match state.options.leagues_status {
        0 | 200 => Json(state.options.leagues.clone()).into_response(),
        status => StatusCode::from_u16(status).unwrap().into_response(),
    }
}

async fn get_credentials(
    State(state): State<Arc<StubStoreState>>,
    Path(_subject): Path<String>,
) -> Response {
    match state.options.credentials_status {
        0 | 200 => Json(json!({
            "primary_secret": "stub-primary",
            "secondary_secret": "stub-secondary",
        }))
        .into_response(),
        status => StatusCode::from_u16(status).unwrap().into_response(),
    }
}

async fn add_season(
    State(state): State<Arc<StubStoreState>>,
    Path(_subject): Path<String>,
    Json(record): Json<serde_json::Value>,
) -> Response {
    let year = record["season_year"].as_i64().unwrap_or(0) as i32;
    if state.options.conflict_years.contains(&year) {
        return StatusCode::CONFLICT.into_response();
    }
    let mut added = state.added_years.lock().unwrap();
    if let Some(limit) = state.options.limit {
        if added.len() >= limit {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"code": "league_limit"})),
            )
                .into_response();
        }
    }
    added.push(year);
    StatusCode::CREATED.into_response()
}

async fn patch_team(
    State(state): State<Arc<StubStoreState>>,
    Path((_subject, league_id, season)): Path<(String, String, i32)>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let team_id = body["team_id"].as_i64().unwrap_or(0);
    state
        .patched
        .lock()
        .unwrap()
        .push((league_id, season, team_id));
    StatusCode::OK.into_response()
}

// ============================================================================
// Stub upstream provider
// ============================================================================

#[derive(Default)]
pub struct StubUpstreamOptions {
    /// Seasons that exist; everything else is 404
    pub found_years: Vec<i32>,
    /// Seasons answered with 429
    pub rate_limited_years: Vec<i32>,
    /// Seasons answered with a markup body (simulates a login bounce)
    pub html_years: Vec<i32>,
    /// Seasons answered 200 with zero teams
    pub empty_years: Vec<i32>,
    pub league_name: String,
}

pub struct StubUpstreamState {
    options: StubUpstreamOptions,
    pub probed_years: Mutex<Vec<i32>>,
}

/// Running stub upstream
pub struct StubUpstream {
    pub base_url: String,
    pub state: Arc<StubUpstreamState>,
    _shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl StubUpstream {
    pub async fn spawn(options: StubUpstreamOptions) -> Self {
        let state = Arc::new(StubUpstreamState {
            options,
            probed_years: Mutex::new(vec![]),
        });

        let app = Router::new()
            .route(
                "/games/{code}/seasons/{year}/leagues/{league_id}",
                get(league_endpoint),
            )
            .with_state(state.clone());

        let (base_url, shutdown_tx) = serve(app).await;

        Self {
            base_url,
            state,
            _shutdown_tx: shutdown_tx,
        }
    }

    pub fn probed_years(&self) -> Vec<i32> {
        self.state.probed_years.lock().unwrap().clone()
    }
}

#[derive(serde::Deserialize, Default)]
struct LeagueQuery {
    #[serde(default)]
    view: Option<String>,
    #[serde(default)]
    team_id: Option<i64>,
    #[serde(default)]
    week: Option<u32>,
}

async fn league_endpoint(
    State(state): State<Arc<StubUpstreamState>>,
    Path((_code, year, league_id)): Path<(String, i32, String)>,
    Query(query): Query<LeagueQuery>,
) -> Response {
    state.probed_years.lock().unwrap().push(year);

    let options = &state.options;
    if options.rate_limited_years.contains(&year) {
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    if options.html_years.contains(&year) {
        return (
            StatusCode::OK,
            [("content-type", "text/html")],
            "<html><body>Please sign in</body></html>",
        )
            .into_response();
    }

    let empty = options.empty_years.contains(&year);
    if !options.found_years.contains(&year) && !empty {
        return StatusCode::NOT_FOUND.into_response();
    }

    let league_name = if options.league_name.is_empty() {
        "Stub League".to_string()
    } else {
        options.league_name.clone()
    };

    match query.view.as_deref() {
        None => Json(json!({
            "id": league_id,
            "name": league_name,
            "season_year": year,
            "current_week": 5,
            "teams": if empty { json!([]) } else { json!([
                {"id": 4, "name": "Bench Mob", "abbrev": "BM"},
                {"id": 7, "name": "Waiver Wizards", "abbrev": "WW"},
            ]) },
        }))
        .into_response(),
        Some("standings") => Json(json!([
            {"team_id": 4, "team_name": "Bench Mob", "wins": 9, "losses": 4, "ties": 0,
             "points_for": 1412.5, "points_against": 1298.0},
            {"team_id": 7, "team_name": "Waiver Wizards", "wins": 4, "losses": 9, "ties": 0,
             "points_for": 1203.0, "points_against": 1377.5},
        ]))
        .into_response(),
        Some("roster") => Json(json!({
            "team_id": query.team_id.unwrap_or(4),
            "team_name": "Bench Mob",
            "slots": [
                {"player": "A. Example", "position": "QB", "slot": "QB"},
                {"player": "B. Sample", "position": "RB", "slot": "RB", "status": "ACTIVE"},
            ],
        }))
        .into_response(),
        Some("matchups") => Json(json!([
            {"week": query.week.unwrap_or(5), "home_team_id": 4, "home_team_name": "Bench Mob",
             "home_score": 101.2, "away_team_id": 7, "away_team_name": "Waiver Wizards",
             "away_score": 98.7},
        ]))
        .into_response(),
        Some(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn serve(app: Router) -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub port");
    let port = listener.local_addr().expect("Failed to get address").port();
    let base_url = format!("http://127.0.0.1:{}", port);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Stub server failed");
    });

    (base_url, shutdown_tx)
}

/// Convenience: football league records for stub store options.
pub fn football_league(league_id: &str, season_year: i32, team_id: Option<i64>) -> StoredLeague {
    StoredLeague {
        platform: "espn".to_string(),
        league_id: league_id.to_string(),
        sport: fantasy_gateway::league_store::Sport::Football,
        season_year,
        team_id,
        league_name: Some(format!("League {}", league_id)),
        team_name: None,
        is_default: None,
    }
}

/// The years the stub upstream answered, deduplicated, preserving order.
pub fn dedup_years(years: Vec<i32>) -> Vec<i32> {
    let mut seen = HashSet::new();
    years.into_iter().filter(|y| seen.insert(*y)).collect()
}
