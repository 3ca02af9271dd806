use axum::extract::FromRef;

use crate::auth::TokenVerifier;
use crate::discovery::DiscoverySettings;
use crate::league_store::LeagueStore;
use crate::resolver::ToolExecutor;
use crate::upstream::FantasyProvider;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedVerifier = Arc<TokenVerifier>;
pub type GuardedStore = Arc<dyn LeagueStore>;
pub type GuardedProvider = Arc<dyn FantasyProvider>;
pub type GuardedExecutor = Arc<ToolExecutor>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub server_version: String,
    pub discovery: DiscoverySettings,
    pub verifier: GuardedVerifier,
    pub store: GuardedStore,
    pub provider: GuardedProvider,
    pub executor: GuardedExecutor,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedVerifier {
    fn from_ref(input: &ServerState) -> Self {
        input.verifier.clone()
    }
}

impl FromRef<ServerState> for GuardedStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedProvider {
    fn from_ref(input: &ServerState) -> Self {
        input.provider.clone()
    }
}

impl FromRef<ServerState> for GuardedExecutor {
    fn from_ref(input: &ServerState) -> Self {
        input.executor.clone()
    }
}
