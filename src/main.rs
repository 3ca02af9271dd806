use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fantasy_gateway::config::{AppConfig, CliConfig, FileConfig};
use fantasy_gateway::league_store::HttpLeagueStore;
use fantasy_gateway::server::{run_server, RequestsLoggingLevel};
use fantasy_gateway::upstream::HttpFantasyProvider;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Optional TOML config file; values there override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3801)]
    pub port: u16,

    /// Base URL of the credential/league store service.
    #[clap(long)]
    pub store_url: Option<String>,

    /// Timeout in seconds for store requests.
    #[clap(long, default_value_t = 5)]
    pub store_timeout_sec: u64,

    /// Base URL of the upstream fantasy-data provider.
    #[clap(long)]
    pub upstream_url: Option<String>,

    /// Timeout in seconds for upstream requests.
    #[clap(long, default_value_t = 7)]
    pub upstream_timeout_sec: u64,

    /// Authentication discovery URL advertised in 401 challenges.
    #[clap(long)]
    pub authorization_url: Option<String>,

    /// Name reported by the server descriptor.
    #[clap(long, default_value = "fantasy-gateway")]
    pub server_name: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// DEVELOPMENT ONLY: accept an unverified identity header when no
    /// bearer token is present.
    #[clap(long)]
    pub dev_insecure_identity: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let cli_config = CliConfig {
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        server_name: cli_args.server_name,
        authorization_url: cli_args.authorization_url,
        store_url: cli_args.store_url,
        store_timeout_sec: cli_args.store_timeout_sec,
        upstream_url: cli_args.upstream_url,
        upstream_timeout_sec: cli_args.upstream_timeout_sec,
        dev_insecure_identity: cli_args.dev_insecure_identity,
    };

    let config = AppConfig::resolve(&cli_config, file_config)?;

    if config.dev_insecure_identity {
        warn!("dev_insecure_identity is enabled: unverified identity headers are accepted");
    }

    let store = Arc::new(HttpLeagueStore::new(
        config.store_url.clone(),
        config.store_timeout_sec,
    ));
    info!("League store configured at {}", store.base_url());

    let provider = Arc::new(HttpFantasyProvider::new(
        config.upstream_url.clone(),
        config.upstream_timeout_sec,
    ));
    info!("Upstream provider configured at {}", provider.base_url());

    info!("Ready to serve at port {}!", config.port);
    run_server(
        config.server_config(),
        config.discovery.clone(),
        store,
        provider,
    )
    .await
}
