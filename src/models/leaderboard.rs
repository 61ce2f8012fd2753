use crate::models::battle::CountryStats;
use crate::models::country::{Country, CountryView};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCriterion {
    #[serde(alias = "taps")]
    Total,
    Intensity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub country: Country,
    pub stats: CountryStats,
    pub rank: usize,
}

impl LeaderboardEntry {
    pub fn into_parts(self) -> (Country, CountryStats) {
        (self.country, self.stats)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardRow {
    pub country_code: String,
    pub country_name: String,
    pub total_taps: u64,
    pub total_players: u64,
}

impl LeaderboardRow {
    pub fn into_standing(self) -> (Country, CountryStats) {
        (
            Country::new(&self.country_code, &self.country_name),
            CountryStats::new(self.total_taps, self.total_players),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardSnapshot {
    pub standings: Vec<(Country, CountryStats)>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub failed: bool,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub sort: Option<SortCriterion>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PollingRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct PollingStatus {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntryView {
    pub rank: usize,
    pub country: CountryView,
    pub taps: u64,
    pub players: u64,
    pub intensity: f64,
}

impl From<&LeaderboardEntry> for LeaderboardEntryView {
    fn from(entry: &LeaderboardEntry) -> Self {
        LeaderboardEntryView {
            rank: entry.rank,
            country: CountryView::from(&entry.country),
            taps: entry.stats.taps,
            players: entry.stats.players,
            intensity: entry.stats.intensity(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub sort: SortCriterion,
    pub fetched_at: Option<DateTime<Utc>>,
    pub stale: bool,
    pub total_countries: usize,
    pub user_country_rank: Option<usize>,
    pub entries: Vec<LeaderboardEntryView>,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub confirm: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResult {
    pub reset: bool,
}
