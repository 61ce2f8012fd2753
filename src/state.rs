use crate::config::Config;
use crate::db::Db;
use crate::error::AppError;
use crate::models::country::{Country, DetectionMethod, UserCountry};
use crate::models::tap::{TapResult, TapStats};
use crate::services::backend::{self, Backend};
use crate::services::geolocation::Geolocator;
use crate::services::leaderboard_feed::LeaderboardFeed;
use crate::services::preferences;
use crate::services::tap_batch::TapBatchAccumulator;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Everything the rendering layer can observe or drive, shared by all workers.
pub struct AppState {
    pub db: Db,
    pub backend: Arc<dyn Backend>,
    pub geolocator: Arc<dyn Geolocator>,
    pub leaderboard: Arc<LeaderboardFeed>,
    taps: Mutex<TapBatchAccumulator>,
}

impl AppState {
    pub fn new(
        config: &Config,
        db: Db,
        backend: Arc<dyn Backend>,
        geolocator: Arc<dyn Geolocator>,
    ) -> Result<Self, AppError> {
        let user_id = preferences::user_id(&db)?;
        let country = preferences::stored_country(&db)?.map(|stored| stored.country);
        let total_taps = preferences::total_taps(&db)?;
        let taps = TapBatchAccumulator::new(config.tap_batch_size, user_id, country, total_taps);
        let leaderboard = Arc::new(LeaderboardFeed::new(
            config.poll_interval,
            config.leaderboard_fetch_limit,
        ));

        Ok(AppState {
            db,
            backend,
            geolocator,
            leaderboard,
            taps: Mutex::new(taps),
        })
    }

    fn with_taps<T>(&self, f: impl FnOnce(&mut TapBatchAccumulator) -> T) -> T {
        let mut taps = self.taps.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut taps)
    }

    pub fn tap_stats(&self) -> TapStats {
        self.with_taps(|taps| taps.stats())
    }

    pub fn user_country_code(&self) -> Option<String> {
        self.with_taps(|taps| taps.country().map(|c| c.code.clone()))
    }

    // The lifetime total is written under the lock so stored values stay ordered.
    pub fn record_tap(&self, now: DateTime<Utc>) -> TapResult {
        let outcome = self.with_taps(|taps| {
            let outcome = taps.tap(now);
            if let Some(total) = outcome.persist_total {
                if let Err(e) = preferences::save_total_taps(&self.db, total) {
                    warn!(error = %e, total, "failed to persist lifetime taps");
                }
            }
            outcome
        });

        if outcome.batch_completed && outcome.submission.is_none() {
            warn!("tap batch completed without a confirmed country, not submitted");
        }

        let submitted = match outcome.submission {
            Some(submission) => {
                backend::dispatch_submission(Arc::clone(&self.backend), submission);
                true
            }
            None => false,
        };

        TapResult {
            stats: outcome.stats,
            submitted,
        }
    }

    pub fn confirm_country(&self, country: Country, method: DetectionMethod) -> Result<UserCountry, AppError> {
        let stored = preferences::save_country(&self.db, country, method)?;
        self.with_taps(|taps| taps.set_country(Some(stored.country.clone())));
        info!(code = %stored.country.code, ?method, "country confirmed");
        Ok(stored)
    }

    pub fn shutdown(&self) -> Result<(), AppError> {
        self.leaderboard.stop();
        let total = self.with_taps(|taps| {
            let total = taps.flush();
            preferences::save_total_taps(&self.db, total).map(|()| total)
        })?;
        info!(total, "flushed lifetime taps");
        Ok(())
    }
}
