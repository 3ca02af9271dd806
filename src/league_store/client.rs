//! HTTP client for the credential/league store service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::models::{NewSeasonRecord, StoredLeague, UpstreamCredentials};
use super::{AddSeasonOutcome, LeagueStore, StoreError};

/// HTTP implementation of [`LeagueStore`].
pub struct HttpLeagueStore {
    client: reqwest::Client,
    base_url: String,
}

/// Error body the store attaches to 4xx responses.
#[derive(Deserialize)]
struct StoreErrorBody {
    #[serde(default)]
    code: Option<String>,
}

impl HttpLeagueStore {
    /// Create a new store client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the store service (e.g., "http://localhost:8090")
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

    fn apply_bearer(
        &self,
        request: reqwest::RequestBuilder,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match bearer {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let response = request.send().await.map_err(classify_transport)?;
        match response.status().as_u16() {
            401 | 403 => Err(StoreError::AuthRejected),
            _ => Ok(response),
        }
    }
}

fn classify_transport(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::TimedOut
    } else {
        StoreError::Transport(err.to_string())
    }
}

#[async_trait]
impl LeagueStore for HttpLeagueStore {
    async fn leagues(
        &self,
        subject: &str,
        bearer: Option<&str>,
    ) -> Result<Vec<StoredLeague>, StoreError> {
        let url = format!("{}/identities/{}/leagues", self.base_url, subject);
        let request = self.apply_bearer(self.client.get(&url), bearer);
        let response = self.send(request).await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn credentials(
        &self,
        subject: &str,
        bearer: Option<&str>,
    ) -> Result<UpstreamCredentials, StoreError> {
        let url = format!("{}/identities/{}/credentials", self.base_url, subject);
        let request = self.apply_bearer(self.client.get(&url), bearer);
        let response = self.send(request).await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn add_season(
        &self,
        subject: &str,
        bearer: Option<&str>,
        record: &NewSeasonRecord,
    ) -> Result<AddSeasonOutcome, StoreError> {
        let url = format!("{}/identities/{}/leagues", self.base_url, subject);
        let request = self.apply_bearer(self.client.post(&url).json(record), bearer);
        let response = self.send(request).await?;

        match response.status().as_u16() {
            200 | 201 => Ok(AddSeasonOutcome::Added),
            409 => Ok(AddSeasonOutcome::AlreadyExists),
            422 => {
                let body: StoreErrorBody = response
                    .json()
                    .await
                    .map_err(|e| StoreError::Malformed(e.to_string()))?;
                if body.code.as_deref() == Some("league_limit") {
                    Ok(AddSeasonOutcome::LimitExceeded)
                } else {
                    Err(StoreError::Status(422))
                }
            }
            status => Err(StoreError::Status(status)),
        }
    }

    async fn set_league_team(
        &self,
        subject: &str,
        bearer: Option<&str>,
        league_id: &str,
        season_year: i32,
        team_id: i64,
    ) -> Result<(), StoreError> {
        let url = format!(
            "{}/identities/{}/leagues/{}/seasons/{}",
            self.base_url, subject, league_id, season_year
        );
        debug!("Patching team {} onto league {} season {}", team_id, league_id, season_year);
        let body = serde_json::json!({ "team_id": team_id });
        let request = self.apply_bearer(self.client.patch(&url).json(&body), bearer);
        let response = self.send(request).await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}
