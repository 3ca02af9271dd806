//! Test server lifecycle management
//!
//! Each test gets an isolated gateway wired to its own stub issuer, stub
//! store, and stub upstream, all on random ports.

use super::constants::*;
use super::issuer::TestIssuer;
use super::stubs::{StubStore, StubStoreOptions, StubUpstream, StubUpstreamOptions};
use fantasy_gateway::auth::TokenVerifier;
use fantasy_gateway::discovery::DiscoverySettings;
use fantasy_gateway::league_store::HttpLeagueStore;
use fantasy_gateway::server::{make_app, RequestsLoggingLevel, ServerConfig};
use fantasy_gateway::upstream::HttpFantasyProvider;
use std::sync::Arc;
use std::time::Duration;

/// Options for spawning a test gateway
pub struct TestServerOptions {
    pub store: StubStoreOptions,
    pub upstream: StubUpstreamOptions,
    pub discovery: DiscoverySettings,
    pub dev_insecure_identity: bool,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            store: StubStoreOptions::default(),
            upstream: StubUpstreamOptions::default(),
            discovery: DiscoverySettings {
                start_year: 2025,
                floor_year: 2000,
                miss_cutoff: 2,
                mandatory_recent_years: 2,
                probe_delay_ms: 0,
                retry_delay_ms: 0,
            },
            dev_insecure_identity: false,
        }
    }
}

/// Gateway instance plus its collaborating stubs
///
/// When dropped, every spawned server shuts down.
pub struct TestServer {
    /// Base URL for gateway requests
    pub base_url: String,

    /// The stub issuer; mints tokens the gateway accepts
    pub issuer: TestIssuer,

    /// The stub store, with recorded writes for assertions
    pub store: StubStore,

    /// The stub upstream, with recorded probes for assertions
    pub upstream: StubUpstream,

    _shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let issuer = TestIssuer::spawn().await;
        let store = StubStore::spawn(options.store).await;
        let upstream = StubUpstream::spawn(options.upstream).await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            server_name: "fantasy-gateway-test".to_string(),
            authorization_url: format!("{}/authorize", base_url),
            dev_insecure_identity: options.dev_insecure_identity,
        };

        let app = make_app(
            config,
            options.discovery,
            Arc::new(TokenVerifier::new()),
            Arc::new(HttpLeagueStore::new(store.base_url.clone(), 5)),
            Arc::new(HttpFantasyProvider::new(upstream.base_url.clone(), 7)),
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            issuer,
            store,
            upstream,
            _shutdown_tx: shutdown_tx,
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the gateway to answer its descriptor endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/mcp", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}
