use crate::models::leaderboard::{
    LeaderboardEntry, LeaderboardEntryView, LeaderboardResponse, LeaderboardRow, LeaderboardSnapshot,
    SortCriterion,
};
use crate::services::backend::Backend;
use crate::services::ranking;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

impl LeaderboardSnapshot {
    pub fn from_rows(rows: Vec<LeaderboardRow>) -> Self {
        LeaderboardSnapshot {
            standings: rows.into_iter().map(LeaderboardRow::into_standing).collect(),
            fetched_at: Some(Utc::now()),
            failed: false,
        }
    }

    pub fn failed() -> Self {
        LeaderboardSnapshot {
            standings: Vec::new(),
            fetched_at: Some(Utc::now()),
            failed: true,
        }
    }

    pub fn ranked(&self, criterion: SortCriterion) -> Vec<LeaderboardEntry> {
        ranking::rank(self.standings.clone(), criterion)
    }
}

pub fn leaderboard_view(
    snapshot: &LeaderboardSnapshot,
    sort: SortCriterion,
    limit: usize,
    user_country: Option<&str>,
) -> LeaderboardResponse {
    let ranked = snapshot.ranked(sort);
    LeaderboardResponse {
        sort,
        fetched_at: snapshot.fetched_at,
        stale: snapshot.failed,
        total_countries: ranked.len(),
        user_country_rank: user_country.and_then(|code| ranking::find_rank(&ranked, code)),
        entries: ranking::top(&ranked, limit)
            .iter()
            .map(LeaderboardEntryView::from)
            .collect(),
    }
}

/// Publishes whole snapshots; readers hold either the previous `Arc` or the new one.
pub struct LeaderboardFeed {
    tx: watch::Sender<Arc<LeaderboardSnapshot>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    interval: Duration,
    fetch_limit: u32,
}

impl LeaderboardFeed {
    pub fn new(interval: Duration, fetch_limit: u32) -> Self {
        let (tx, _) = watch::channel(Arc::new(LeaderboardSnapshot::default()));
        LeaderboardFeed {
            tx,
            poller: Mutex::new(None),
            interval,
            fetch_limit,
        }
    }

    pub fn current(&self) -> Arc<LeaderboardSnapshot> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<LeaderboardSnapshot>> {
        self.tx.subscribe()
    }

    pub fn publish(&self, snapshot: LeaderboardSnapshot) -> Arc<LeaderboardSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(snapshot.clone());
        snapshot
    }

    pub async fn refresh(&self, backend: &dyn Backend) -> Arc<LeaderboardSnapshot> {
        match backend.fetch_leaderboard(self.fetch_limit).await {
            Ok(rows) => {
                debug!(rows = rows.len(), "leaderboard refreshed");
                self.publish(LeaderboardSnapshot::from_rows(rows))
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch leaderboard");
                self.publish(LeaderboardSnapshot::failed())
            }
        }
    }

    pub fn start(self: &Arc<Self>, backend: Arc<dyn Backend>) {
        let feed = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(feed.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                feed.refresh(backend.as_ref()).await;
            }
        });

        let mut poller = self.poller.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = poller.replace(handle) {
            previous.abort();
        }
        info!(interval_secs = self.interval.as_secs(), "leaderboard polling started");
    }

    pub fn stop(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(handle) = poller.take() {
            handle.abort();
            info!("leaderboard polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        let poller = self.poller.lock().unwrap_or_else(|p| p.into_inner());
        poller.as_ref().is_some_and(|h| !h.is_finished())
    }
}
