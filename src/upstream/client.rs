//! HTTP client for the upstream fantasy-data provider.
//!
//! Credentials are forwarded as request headers; every call carries the
//! client-wide timeout so a hung upstream produces a distinct timed-out
//! outcome instead of a stuck request.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::models::{LeagueInfo, Matchup, StandingEntry, TeamRoster};
use super::{FantasyProvider, FetchError};
use crate::league_store::{Sport, UpstreamCredentials};

const HEADER_SESSION_TOKEN: &str = "X-Session-Token";
const HEADER_OWNER_ID: &str = "X-Owner-Id";

/// HTTP implementation of [`FantasyProvider`].
pub struct HttpFantasyProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFantasyProvider {
    /// Create a new provider client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the provider API
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        let base_url = base_url.trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn league_url(&self, sport: Sport, league_id: &str, season_year: i32) -> String {
        format!(
            "{}/games/{}/seasons/{}/leagues/{}",
            self.base_url,
            sport.game_code(),
            season_year,
            league_id
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        credentials: &UpstreamCredentials,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .header(HEADER_SESSION_TOKEN, &credentials.primary_secret)
            .header(HEADER_OWNER_ID, &credentials.secondary_secret)
            .query(query)
            .send()
            .await
            .map_err(classify_transport)?;

        match response.status().as_u16() {
            404 => return Err(FetchError::NotFound),
            429 => return Err(FetchError::RateLimited),
            401 | 403 => return Err(FetchError::AuthRejected),
            status if status >= 500 => {
                return Err(FetchError::Transient(format!("upstream status {}", status)))
            }
            status if status >= 400 => {
                return Err(FetchError::Malformed(format!("upstream status {}", status)))
            }
            _ => {}
        }

        let body = response.text().await.map_err(classify_transport)?;

        // A markup body where JSON was expected means the provider bounced us
        // to its login page: a credential failure, not a parse bug.
        let value: serde_json::Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) => return Err(FetchError::AuthRejected),
        };

        serde_json::from_value(value).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

fn classify_transport(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::TimedOut
    } else {
        FetchError::Transient(err.to_string())
    }
}

#[async_trait]
impl FantasyProvider for HttpFantasyProvider {
    async fn league_info(
        &self,
        credentials: &UpstreamCredentials,
        sport: Sport,
        league_id: &str,
        season_year: i32,
    ) -> Result<LeagueInfo, FetchError> {
        let url = self.league_url(sport, league_id, season_year);
        self.get_json(&url, credentials, &[]).await
    }

    async fn standings(
        &self,
        credentials: &UpstreamCredentials,
        sport: Sport,
        league_id: &str,
        season_year: i32,
    ) -> Result<Vec<StandingEntry>, FetchError> {
        let url = self.league_url(sport, league_id, season_year);
        self.get_json(&url, credentials, &[("view", "standings".to_string())])
            .await
    }

    async fn roster(
        &self,
        credentials: &UpstreamCredentials,
        sport: Sport,
        league_id: &str,
        season_year: i32,
        team_id: i64,
    ) -> Result<TeamRoster, FetchError> {
        let url = self.league_url(sport, league_id, season_year);
        self.get_json(
            &url,
            credentials,
            &[
                ("view", "roster".to_string()),
                ("team_id", team_id.to_string()),
            ],
        )
        .await
    }

    async fn matchups(
        &self,
        credentials: &UpstreamCredentials,
        sport: Sport,
        league_id: &str,
        season_year: i32,
        week: Option<u32>,
    ) -> Result<Vec<Matchup>, FetchError> {
        let url = self.league_url(sport, league_id, season_year);
        let mut query = vec![("view", "matchups".to_string())];
        if let Some(week) = week {
            query.push(("week", week.to_string()));
        }
        self.get_json(&url, credentials, &query).await
    }
}
