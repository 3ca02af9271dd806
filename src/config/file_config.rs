use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub server_name: Option<String>,
    pub authorization_url: Option<String>,
    pub store_url: Option<String>,
    pub store_timeout_sec: Option<u64>,
    pub upstream_url: Option<String>,
    pub upstream_timeout_sec: Option<u64>,
    pub dev_insecure_identity: Option<bool>,

    // Feature configs
    pub discovery: Option<DiscoveryConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub floor_year: Option<i32>,
    pub miss_cutoff: Option<u32>,
    pub mandatory_recent_years: Option<i32>,
    pub probe_delay_ms: Option<u64>,
    pub retry_delay_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
