//! Data models shared with the credential/league store.

use serde::{Deserialize, Serialize};

/// A sport supported by the upstream fantasy provider.
///
/// Parsing accepts the full sport name (any case) as well as the provider's
/// three-letter game codes (`ffl`, `flb`, `fba`, `fhl`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sport {
    Football,
    Baseball,
    Basketball,
    Hockey,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Football => "football",
            Sport::Baseball => "baseball",
            Sport::Basketball => "basketball",
            Sport::Hockey => "hockey",
        }
    }

    /// The provider's game code for this sport, used in upstream URLs.
    pub fn game_code(&self) -> &'static str {
        match self {
            Sport::Football => "ffl",
            Sport::Baseball => "flb",
            Sport::Basketball => "fba",
            Sport::Hockey => "fhl",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "football" | "ffl" | "nfl" => Some(Sport::Football),
            "baseball" | "flb" | "mlb" => Some(Sport::Baseball),
            "basketball" | "fba" | "nba" => Some(Sport::Basketball),
            "hockey" | "fhl" | "nhl" => Some(Sport::Hockey),
            _ => None,
        }
    }

    /// First month (1-12) of the sport's season year. Before this month the
    /// ongoing season still belongs to the previous calendar year.
    pub fn rollover_month(&self) -> u32 {
        match self {
            Sport::Football => 8,
            Sport::Baseball => 4,
            Sport::Basketball => 10,
            Sport::Hockey => 10,
        }
    }

    /// The default season year for this sport as of `today`.
    pub fn current_season(&self, today: chrono::NaiveDate) -> i32 {
        use chrono::Datelike;
        if today.month() < self.rollover_month() {
            today.year() - 1
        } else {
            today.year()
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sport {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Sport::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown sport: {}", raw)))
    }
}

/// One league membership record owned by the store.
///
/// Uniquely keyed by `(identity, platform, league_id, sport, season_year)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLeague {
    pub platform: String,
    pub league_id: String,
    pub sport: Sport,
    pub season_year: i32,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub league_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

impl StoredLeague {
    /// Human-readable label for disambiguation messages.
    pub fn label(&self) -> String {
        let name = self.league_name.as_deref().unwrap_or("unnamed league");
        format!("{} (id {}, season {})", name, self.league_id, self.season_year)
    }
}

/// Raw upstream credentials, opaque to the gateway beyond forwarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamCredentials {
    pub primary_secret: String,
    pub secondary_secret: String,
    #[serde(default)]
    pub owner_email: Option<String>,
}

/// Payload for the store's idempotent season-add call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSeasonRecord {
    pub platform: String,
    pub league_id: String,
    pub sport: Sport,
    pub season_year: i32,
    #[serde(default)]
    pub league_name: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub team_name: Option<String>,
}
