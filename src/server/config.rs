//! Server-scoped configuration.

use super::RequestsLoggingLevel;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub requests_logging_level: RequestsLoggingLevel,
    /// Name reported by the descriptor and `initialize`.
    pub server_name: String,
    /// Authentication discovery URL advertised in 401 challenges.
    pub authorization_url: String,
    /// Accept a caller-supplied identity header instead of a token.
    /// Development aid only; never enable in production.
    pub dev_insecure_identity: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3801,
            requests_logging_level: RequestsLoggingLevel::default(),
            server_name: "fantasy-gateway".to_string(),
            authorization_url: "http://localhost:3801/authorize".to_string(),
            dev_insecure_identity: false,
        }
    }
}
