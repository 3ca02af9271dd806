//! Fantasy Gateway Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod auth;
pub mod config;
pub mod discovery;
pub mod league_store;
pub mod mcp;
pub mod resolver;
pub mod server;
pub mod upstream;

// Re-export commonly used types for convenience
pub use auth::{AuthError, TokenVerifier, VerifiedIdentity};
pub use league_store::{HttpLeagueStore, LeagueStore, Sport, StoredLeague};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use upstream::{FantasyProvider, HttpFantasyProvider};
