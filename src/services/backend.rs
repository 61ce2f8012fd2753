use crate::config::Config;
use crate::error::BackendError;
use crate::models::battle::{BattleId, SubmissionRequest};
use crate::models::leaderboard::LeaderboardRow;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const RESET_TABLES: &[&str] = &["user_taps", "country_stats", "battles"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleCreation {
    Created,
    AlreadyExists,
}

/// Remote aggregate store. Atomic increments and aggregation happen on the other side.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn ensure_battle(
        &self,
        battle_id: &BattleId,
        timestamp: DateTime<Utc>,
    ) -> Result<BattleCreation, BackendError>;

    async fn increment_country_taps(&self, submission: &SubmissionRequest) -> Result<(), BackendError>;

    async fn fetch_leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardRow>, BackendError>;

    async fn reset_all(&self) -> Result<(), BackendError>;
}

pub struct SupabaseBackend {
    client: reqwest::Client,
    rest_url: String,
    api_key: String,
    leaderboard_view: String,
}

impl SupabaseBackend {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        Ok(SupabaseBackend {
            client,
            rest_url: format!("{}/rest/v1", config.supabase_url.trim_end_matches('/')),
            api_key: config.supabase_anon_key.clone(),
            leaderboard_view: config.leaderboard_view.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let raw = format!("{}/{}", self.rest_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| BackendError::InvalidRequest(format!("{raw}: {e}")))
    }
}

fn ensure_success(status: StatusCode) -> Result<(), BackendError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(BackendError::ServerError(status.as_u16()))
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn ensure_battle(
        &self,
        battle_id: &BattleId,
        timestamp: DateTime<Utc>,
    ) -> Result<BattleCreation, BackendError> {
        let response = self
            .client
            .post(self.endpoint("battles")?)
            .header("apikey", &self.api_key)
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({
                "id": battle_id,
                "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT => Ok(BattleCreation::AlreadyExists),
            status if status.is_success() => Ok(BattleCreation::Created),
            status => Err(BackendError::ServerError(status.as_u16())),
        }
    }

    async fn increment_country_taps(&self, submission: &SubmissionRequest) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint("rpc/increment_country_taps")?)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({
                "p_battle_id": submission.battle_id,
                "p_country_code": submission.country_code,
                "p_country_name": submission.country_name,
                "p_user_id": submission.user_id,
                "p_taps": submission.tap_count,
            }))
            .send()
            .await?;
        ensure_success(response.status())
    }

    async fn fetch_leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardRow>, BackendError> {
        let url = self.endpoint(&self.leaderboard_view)?;
        debug!(%url, limit, "fetching leaderboard");
        let response = self
            .client
            .get(url)
            .query(&[("limit", limit)])
            .header("apikey", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_string());
            warn!(status = status.as_u16(), %body, "leaderboard request rejected");
            return Err(BackendError::ServerError(status.as_u16()));
        }

        let rows: Vec<LeaderboardRow> = response.json().await?;
        debug!(rows = rows.len(), "decoded leaderboard");
        Ok(rows)
    }

    async fn reset_all(&self) -> Result<(), BackendError> {
        for table in RESET_TABLES {
            let response = self
                .client
                .delete(self.endpoint(&format!("{table}?select=*"))?)
                .header("apikey", &self.api_key)
                .header("Prefer", "return=minimal")
                .send()
                .await?;
            if let Err(e) = ensure_success(response.status()) {
                warn!(table, error = %e, "failed to clear table");
                return Err(e);
            }
            info!(table, "cleared table");
        }
        Ok(())
    }
}

pub async fn submit_batch(backend: &dyn Backend, submission: &SubmissionRequest) -> Result<(), BackendError> {
    match backend
        .ensure_battle(&submission.battle_id, submission.timestamp)
        .await
    {
        Ok(created) => debug!(battle_id = %submission.battle_id, ?created, "battle ensured"),
        Err(BackendError::NetworkUnavailable(msg)) => {
            return Err(BackendError::NetworkUnavailable(msg))
        }
        // The increment call is authoritative; a rejected create is not fatal.
        Err(e) => debug!(battle_id = %submission.battle_id, error = %e, "battle create not confirmed"),
    }
    backend.increment_country_taps(submission).await
}

pub fn dispatch_submission(backend: Arc<dyn Backend>, submission: SubmissionRequest) {
    tokio::spawn(async move {
        match submit_batch(backend.as_ref(), &submission).await {
            Ok(()) => info!(
                battle_id = %submission.battle_id,
                country = %submission.country_code,
                taps = submission.tap_count,
                "submitted tap batch"
            ),
            Err(e) => warn!(
                battle_id = %submission.battle_id,
                country = %submission.country_code,
                error = %e,
                "dropping tap batch"
            ),
        }
    });
}
