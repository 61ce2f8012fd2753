use crate::models::battle::SubmissionRequest;
use crate::models::country::Country;
use crate::models::tap::{BatchState, TapStats};
use crate::services::battle_clock;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct TapOutcome {
    pub stats: TapStats,
    pub batch_completed: bool,
    pub submission: Option<SubmissionRequest>,
    pub persist_total: Option<u64>,
}

/// Turns single taps into fixed-size batches. Callers serialize access; nothing here is shared.
#[derive(Debug)]
pub struct TapBatchAccumulator {
    batch_size: u32,
    pending: u32,
    session_taps: u64,
    total_taps: u64,
    user_id: String,
    country: Option<Country>,
}

impl TapBatchAccumulator {
    pub fn new(batch_size: u32, user_id: String, country: Option<Country>, total_taps: u64) -> Self {
        TapBatchAccumulator {
            batch_size: batch_size.max(1),
            pending: 0,
            session_taps: 0,
            total_taps,
            user_id,
            country,
        }
    }

    pub fn state(&self) -> BatchState {
        if self.pending == 0 {
            BatchState::Idle
        } else {
            BatchState::Accumulating(self.pending)
        }
    }

    pub fn stats(&self) -> TapStats {
        TapStats {
            batch: self.state(),
            pending_taps: self.pending,
            session_taps: self.session_taps,
            total_taps: self.total_taps,
        }
    }

    pub fn country(&self) -> Option<&Country> {
        self.country.as_ref()
    }

    pub fn set_country(&mut self, country: Option<Country>) {
        self.country = country;
    }

    pub fn tap(&mut self, now: DateTime<Utc>) -> TapOutcome {
        self.pending += 1;
        self.session_taps += 1;
        self.total_taps += 1;

        if self.pending < self.batch_size {
            return TapOutcome {
                stats: self.stats(),
                batch_completed: false,
                submission: None,
                persist_total: None,
            };
        }

        // Reset before anything is dispatched; a failed send never restores these taps.
        let tap_count = self.pending;
        self.pending = 0;

        let submission = self.country.as_ref().map(|country| SubmissionRequest {
            battle_id: battle_clock::current_battle_id(now),
            country_code: country.code.clone(),
            country_name: country.name.clone(),
            user_id: self.user_id.clone(),
            tap_count,
            timestamp: now,
        });

        TapOutcome {
            stats: self.stats(),
            batch_completed: true,
            submission,
            persist_total: Some(self.total_taps),
        }
    }

    pub fn flush(&self) -> u64 {
        self.total_taps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 5, 14, 12, 0).unwrap()
    }

    fn accumulator() -> TapBatchAccumulator {
        TapBatchAccumulator::new(10, "user-1".into(), Some(Country::from_code("IL")), 0)
    }

    #[test]
    fn test_ten_taps_emit_one_submission() {
        let mut acc = accumulator();
        let mut submissions = Vec::new();
        for _ in 0..10 {
            let outcome = acc.tap(now());
            submissions.extend(outcome.submission);
        }

        assert_eq!(submissions.len(), 1);
        let sub = &submissions[0];
        assert_eq!(sub.tap_count, 10);
        assert_eq!(sub.battle_id.as_str(), "2025-10-05-14");
        assert_eq!(sub.country_code, "IL");
        assert_eq!(sub.country_name, "Israel");
        assert_eq!(sub.user_id, "user-1");
        assert_eq!(sub.timestamp, now());

        assert_eq!(acc.state(), BatchState::Idle);
        assert_eq!(acc.stats().pending_taps, 0);
        assert_eq!(acc.stats().total_taps, 10);
        assert_eq!(acc.flush(), 10);
    }

    #[test]
    fn test_state_transitions() {
        let mut acc = accumulator();
        assert_eq!(acc.state(), BatchState::Idle);
        acc.tap(now());
        assert_eq!(acc.state(), BatchState::Accumulating(1));
        for _ in 0..8 {
            acc.tap(now());
        }
        assert_eq!(acc.state(), BatchState::Accumulating(9));
        let outcome = acc.tap(now());
        assert!(outcome.batch_completed);
        assert_eq!(outcome.persist_total, Some(10));
        assert_eq!(acc.state(), BatchState::Idle);
    }

    #[test]
    fn test_persist_only_on_batch_boundary() {
        let mut acc = TapBatchAccumulator::new(10, "u".into(), None, 95);
        let persisted: Vec<u64> = (0..25).filter_map(|_| acc.tap(now()).persist_total).collect();
        assert_eq!(persisted, vec![105, 115]);
        assert_eq!(acc.stats().session_taps, 25);
        assert_eq!(acc.flush(), 120);
    }

    #[test]
    fn test_batch_without_country_resets_silently() {
        let mut acc = TapBatchAccumulator::new(10, "u".into(), None, 0);
        let outcome = (0..10).map(|_| acc.tap(now())).last().unwrap();
        assert!(outcome.batch_completed);
        assert!(outcome.submission.is_none());
        assert_eq!(acc.state(), BatchState::Idle);

        acc.set_country(Some(Country::from_code("US")));
        let outcome = (0..10).map(|_| acc.tap(now())).last().unwrap();
        assert_eq!(outcome.submission.map(|s| s.tap_count), Some(10));
    }
}
