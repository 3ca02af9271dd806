use anyhow::Result;
use std::{sync::Arc, time::Instant};

use tracing::info;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::{log_requests, rest, state::ServerState, ServerConfig};
use crate::auth::TokenVerifier;
use crate::discovery::DiscoverySettings;
use crate::league_store::LeagueStore;
use crate::mcp::handler::{descriptor, rpc_endpoint};
use crate::mcp::tools::register_all_tools;
use crate::mcp::ToolRegistry;
use crate::resolver::ToolExecutor;
use crate::upstream::FantasyProvider;

fn server_version() -> String {
    format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"))
}

pub fn make_app(
    config: ServerConfig,
    discovery: DiscoverySettings,
    verifier: Arc<TokenVerifier>,
    store: Arc<dyn LeagueStore>,
    provider: Arc<dyn FantasyProvider>,
) -> Router {
    let mut registry = ToolRegistry::new();
    register_all_tools(&mut registry);
    info!("Tool registry initialized with {} tools", registry.tool_count());

    let executor = Arc::new(ToolExecutor::new(
        Arc::new(registry),
        store.clone(),
        provider.clone(),
        discovery.clone(),
    ));

    let state = ServerState {
        config,
        start_time: Instant::now(),
        server_version: server_version(),
        discovery,
        verifier,
        store,
        provider,
        executor,
    };

    let mut app: Router = Router::new()
        .route("/mcp", get(descriptor).post(rpc_endpoint))
        .route("/v1/tools/{name}", post(rest::call_tool))
        .route(
            "/v1/leagues/{league_id}/discover-seasons",
            post(rest::discover_seasons),
        )
        .with_state(state.clone());

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(super::slowdown_request));
    }
    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    app
}

pub async fn run_server(
    config: ServerConfig,
    discovery: DiscoverySettings,
    store: Arc<dyn LeagueStore>,
    provider: Arc<dyn FantasyProvider>,
) -> Result<()> {
    let port = config.port;
    let app = make_app(
        config,
        discovery,
        Arc::new(TokenVerifier::new()),
        store,
        provider,
    );

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
