mod file_config;

pub use file_config::{DiscoveryConfig, FileConfig};

use crate::discovery::DiscoverySettings;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub server_name: String,
    pub authorization_url: Option<String>,
    pub store_url: Option<String>,
    pub store_timeout_sec: u64,
    pub upstream_url: Option<String>,
    pub upstream_timeout_sec: u64,
    pub dev_insecure_identity: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3801,
            logging_level: RequestsLoggingLevel::default(),
            server_name: "fantasy-gateway".to_string(),
            authorization_url: None,
            store_url: None,
            store_timeout_sec: 5,
            upstream_url: None,
            upstream_timeout_sec: 7,
            dev_insecure_identity: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub server_name: String,
    pub authorization_url: String,
    pub store_url: String,
    pub store_timeout_sec: u64,
    pub upstream_url: String,
    pub upstream_timeout_sec: u64,
    pub dev_insecure_identity: bool,

    // Feature configs (with defaults)
    pub discovery: DiscoverySettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let server_name = file.server_name.unwrap_or_else(|| cli.server_name.clone());

        let store_url = file
            .store_url
            .or_else(|| cli.store_url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("store_url must be specified via --store-url or in config file")
            })?;

        let upstream_url = file
            .upstream_url
            .or_else(|| cli.upstream_url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "upstream_url must be specified via --upstream-url or in config file"
                )
            })?;

        let authorization_url = file
            .authorization_url
            .or_else(|| cli.authorization_url.clone())
            .unwrap_or_else(|| format!("http://localhost:{}/authorize", port));

        let store_timeout_sec = file.store_timeout_sec.unwrap_or(cli.store_timeout_sec);
        let upstream_timeout_sec = file
            .upstream_timeout_sec
            .unwrap_or(cli.upstream_timeout_sec);

        if store_timeout_sec == 0 || upstream_timeout_sec == 0 {
            bail!("timeouts must be at least 1 second");
        }

        let dev_insecure_identity = file
            .dev_insecure_identity
            .unwrap_or(cli.dev_insecure_identity);

        // Discovery settings - merge file config with defaults
        let discovery_file = file.discovery.unwrap_or_default();
        let defaults = DiscoverySettings::default();
        let discovery = DiscoverySettings {
            start_year: defaults.start_year,
            floor_year: discovery_file.floor_year.unwrap_or(defaults.floor_year),
            miss_cutoff: discovery_file.miss_cutoff.unwrap_or(defaults.miss_cutoff),
            mandatory_recent_years: discovery_file
                .mandatory_recent_years
                .unwrap_or(defaults.mandatory_recent_years),
            probe_delay_ms: discovery_file
                .probe_delay_ms
                .unwrap_or(defaults.probe_delay_ms),
            retry_delay_ms: discovery_file
                .retry_delay_ms
                .unwrap_or(defaults.retry_delay_ms),
        };

        if discovery.floor_year < 1990 {
            bail!("discovery.floor_year must be 1990 or later");
        }

        Ok(Self {
            port,
            logging_level,
            server_name,
            authorization_url,
            store_url,
            store_timeout_sec,
            upstream_url,
            upstream_timeout_sec,
            dev_insecure_identity,
            discovery,
        })
    }

    pub fn server_config(&self) -> crate::server::ServerConfig {
        crate::server::ServerConfig {
            port: self.port,
            requests_logging_level: self.logging_level.clone(),
            server_name: self.server_name.clone(),
            authorization_url: self.authorization_url.clone(),
            dev_insecure_identity: self.dev_insecure_identity,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
