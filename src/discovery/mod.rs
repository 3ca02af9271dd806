//! Season discovery.
//!
//! Walks a league backward through calendar years, probing the upstream
//! provider for seasons that actually exist and persisting each hit through
//! the store's idempotent add call. The walk is intentionally sequential:
//! it respects upstream per-identity rate limits and keeps the miss-streak
//! bookkeeping order-dependent and simple.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::league_store::{
    AddSeasonOutcome, LeagueStore, NewSeasonRecord, StoreError, StoredLeague, UpstreamCredentials,
};
use crate::upstream::{FantasyProvider, FetchError, LeagueInfo};

/// Tuning knobs for the discovery walk.
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    /// Most recent year to examine. Defaults to the current calendar year.
    pub start_year: i32,
    /// Oldest year ever examined.
    pub floor_year: i32,
    /// Consecutive misses (outside the mandatory window) that stop the walk.
    pub miss_cutoff: u32,
    /// The N most recent years are always probed, even through a miss streak.
    pub mandatory_recent_years: i32,
    /// Pause between probes, to avoid hammering the upstream service.
    pub probe_delay_ms: u64,
    /// Pause before the single retry of a transient failure.
    pub retry_delay_ms: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            start_year: chrono::Utc::now().year(),
            floor_year: 2000,
            miss_cutoff: 2,
            mandatory_recent_years: 2,
            probe_delay_ms: 400,
            retry_delay_ms: 500,
        }
    }
}

/// One season confirmed by probing. Persisted immediately, then reported.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredSeason {
    pub season_year: i32,
    pub league_name: String,
    pub team_count: usize,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

/// Outcome of one discovery run.
#[derive(Debug, Default, Serialize)]
pub struct DiscoveryReport {
    pub discovered: Vec<DiscoveredSeason>,
    /// Upstream rate limit hit; partial results, never retried.
    pub rate_limited: bool,
    /// The store refused further seasons for this identity.
    pub limit_exceeded: bool,
    /// The walk examined every year down to the floor.
    pub min_year_reached: bool,
    /// Years skipped because a record already existed.
    pub skipped: u32,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The upstream rejected the credentials before any season was ever
    /// confirmed: the credentials themselves are most likely invalid.
    #[error("upstream rejected the stored credentials")]
    CredentialsRejected,
    #[error(transparent)]
    Store(#[from] StoreError),
}

enum ProbeOutcome {
    Hit(LeagueInfo),
    Miss,
    RateLimited,
    AuthRejected,
}

/// Sequential backward prober over a league's historical seasons.
pub struct SeasonProber {
    store: Arc<dyn LeagueStore>,
    provider: Arc<dyn FantasyProvider>,
    settings: DiscoverySettings,
}

impl SeasonProber {
    pub fn new(
        store: Arc<dyn LeagueStore>,
        provider: Arc<dyn FantasyProvider>,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    /// Discover and persist the historical seasons of `league`.
    ///
    /// `base_team_id` is the team the identity owns in the league; each
    /// discovered season is matched against it so the season record carries
    /// the team association when the team exists that year.
    pub async fn discover(
        &self,
        league: &StoredLeague,
        base_team_id: i64,
        subject: &str,
        bearer: Option<&str>,
        credentials: &UpstreamCredentials,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let settings = &self.settings;
        let existing = self.stored_years(league, subject, bearer).await?;

        let mut report = DiscoveryReport::default();
        // A season counts as confirmed whether stored previously or found in
        // this run; the distinction matters for the credential-failure rule.
        let mut confirmed_any = !existing.is_empty();
        let mut misses = 0u32;
        let mut probed_once = false;
        let mandatory_floor = settings.start_year - settings.mandatory_recent_years + 1;

        info!(
            "Starting season discovery for league {} ({} to {})",
            league.league_id, settings.start_year, settings.floor_year
        );

        let mut year = settings.start_year;
        while year >= settings.floor_year {
            if existing.contains(&year) {
                debug!("Season {} already stored, skipping", year);
                report.skipped += 1;
                year -= 1;
                continue;
            }

            let in_mandatory_window = year >= mandatory_floor;
            if !in_mandatory_window && misses >= settings.miss_cutoff {
                debug!(
                    "Stopping at {}: {} consecutive misses outside the mandatory window",
                    year, misses
                );
                return Ok(report);
            }

            if probed_once && settings.probe_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(settings.probe_delay_ms)).await;
            }
            probed_once = true;

            match self.probe(league, credentials, year).await {
                ProbeOutcome::Hit(info) => {
                    misses = 0;
                    confirmed_any = true;
                    let season = season_from_info(&info, year, base_team_id);
                    info!(
                        "Found season {} for league {} ({} teams)",
                        year,
                        league.league_id,
                        season.team_count
                    );
                    report.discovered.push(season.clone());

                    match self
                        .persist(league, &season, base_team_id, subject, bearer)
                        .await?
                    {
                        PersistOutcome::Stored => {}
                        PersistOutcome::LimitExceeded => {
                            report.limit_exceeded = true;
                            return Ok(report);
                        }
                    }
                }
                ProbeOutcome::Miss => {
                    misses += 1;
                    debug!("Season {} not found (miss streak {})", year, misses);
                }
                ProbeOutcome::RateLimited => {
                    warn!(
                        "Upstream rate limit hit at season {}; returning partial results",
                        year
                    );
                    report.rate_limited = true;
                    return Ok(report);
                }
                ProbeOutcome::AuthRejected => {
                    if confirmed_any {
                        // Some providers gate individual old seasons
                        // independently of overall credential validity.
                        misses += 1;
                        debug!("Season {} rejected access; counting as a miss", year);
                    } else {
                        warn!(
                            "Upstream rejected credentials before any confirmed season; aborting"
                        );
                        return Err(DiscoveryError::CredentialsRejected);
                    }
                }
            }

            year -= 1;
        }

        report.min_year_reached = true;
        Ok(report)
    }

    /// Season years already stored for this league.
    async fn stored_years(
        &self,
        league: &StoredLeague,
        subject: &str,
        bearer: Option<&str>,
    ) -> Result<HashSet<i32>, DiscoveryError> {
        let leagues = self.store.leagues(subject, bearer).await?;
        Ok(leagues
            .iter()
            .filter(|l| l.league_id == league.league_id && l.sport == league.sport)
            .map(|l| l.season_year)
            .collect())
    }

    /// One probe, with a single delayed retry for transient failures.
    async fn probe(
        &self,
        league: &StoredLeague,
        credentials: &UpstreamCredentials,
        year: i32,
    ) -> ProbeOutcome {
        let mut result = self
            .provider
            .league_info(credentials, league.sport, &league.league_id, year)
            .await;

        if let Err(err) = &result {
            if err.is_retryable() {
                debug!("Probe for {} failed ({}), retrying once", year, err);
                tokio::time::sleep(Duration::from_millis(self.settings.retry_delay_ms)).await;
                result = self
                    .provider
                    .league_info(credentials, league.sport, &league.league_id, year)
                    .await;
            }
        }

        match result {
            // A league that responds with zero teams is not a real season.
            Ok(info) if info.teams.is_empty() => ProbeOutcome::Miss,
            Ok(info) => ProbeOutcome::Hit(info),
            Err(FetchError::NotFound) => ProbeOutcome::Miss,
            Err(FetchError::RateLimited) => ProbeOutcome::RateLimited,
            Err(FetchError::AuthRejected) => ProbeOutcome::AuthRejected,
            Err(err) => {
                debug!("Probe for {} still failing ({}), counting as a miss", year, err);
                ProbeOutcome::Miss
            }
        }
    }

    /// Persist a discovered season. Conflicts are resolved by attaching the
    /// base team to the existing record instead of failing.
    async fn persist(
        &self,
        league: &StoredLeague,
        season: &DiscoveredSeason,
        base_team_id: i64,
        subject: &str,
        bearer: Option<&str>,
    ) -> Result<PersistOutcome, DiscoveryError> {
        let record = NewSeasonRecord {
            platform: league.platform.clone(),
            league_id: league.league_id.clone(),
            sport: league.sport,
            season_year: season.season_year,
            league_name: Some(season.league_name.clone()),
            team_id: season.team_id,
            team_name: season.team_name.clone(),
        };

        let mut outcome = self.store.add_season(subject, bearer, &record).await;
        if let Err(err) = &outcome {
            if err.is_retryable() {
                tokio::time::sleep(Duration::from_millis(self.settings.retry_delay_ms)).await;
                outcome = self.store.add_season(subject, bearer, &record).await;
            }
        }

        match outcome? {
            AddSeasonOutcome::Added => Ok(PersistOutcome::Stored),
            AddSeasonOutcome::AlreadyExists => {
                // Lost a race or the stale-check missed it; attach the team
                // to the existing record instead of treating it as an error.
                if let Err(err) = self
                    .store
                    .set_league_team(
                        subject,
                        bearer,
                        &league.league_id,
                        season.season_year,
                        base_team_id,
                    )
                    .await
                {
                    // Non-fatal: the season exists without a team
                    // association until corrected.
                    warn!(
                        "Failed to attach team {} to existing season {}: {}",
                        base_team_id, season.season_year, err
                    );
                }
                Ok(PersistOutcome::Stored)
            }
            AddSeasonOutcome::LimitExceeded => Ok(PersistOutcome::LimitExceeded),
        }
    }
}

enum PersistOutcome {
    Stored,
    LimitExceeded,
}

fn season_from_info(info: &LeagueInfo, year: i32, base_team_id: i64) -> DiscoveredSeason {
    let base_team = info.teams.iter().find(|t| t.id == base_team_id);
    DiscoveredSeason {
        season_year: year,
        league_name: info.name.clone(),
        team_count: info.teams.len(),
        team_id: base_team.map(|t| t.id),
        team_name: base_team.map(|t| t.name.clone()),
    }
}
