use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `YYYY-MM-DD-HH` of the UTC hour start.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleId(pub String);

impl BattleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleWindow {
    pub id: BattleId,
    pub starts_at: DateTime<Utc>,
    pub live_until: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl BattleWindow {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at && now < self.live_until
    }
}

/// Per-country aggregate. Intensity is derived on read and never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryStats {
    pub taps: u64,
    pub players: u64,
}

impl CountryStats {
    pub fn new(taps: u64, players: u64) -> Self {
        CountryStats { taps, players }
    }

    pub fn intensity(&self) -> f64 {
        if self.players > 0 {
            self.taps as f64 / self.players as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRequest {
    pub battle_id: BattleId,
    pub country_code: String,
    pub country_name: String,
    pub user_id: String,
    pub tap_count: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BattleInfo {
    pub battle_id: BattleId,
    pub starts_at: DateTime<Utc>,
    pub live_until: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub next_battle_at: DateTime<Utc>,
    pub is_live: bool,
    pub seconds_until_next: i64,
}
