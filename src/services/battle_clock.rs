use crate::models::battle::{BattleId, BattleInfo, BattleWindow};
use chrono::{DateTime, Duration, Timelike, Utc};

const BATTLE_LENGTH_HOURS: i64 = 1;
const LIVE_WINDOW_SECS: i64 = 10;

fn hour_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let into_hour = Duration::seconds(i64::from(now.minute() * 60 + now.second()))
        + Duration::nanoseconds(i64::from(now.nanosecond()));
    now - into_hour
}

pub fn current_battle_id(now: DateTime<Utc>) -> BattleId {
    BattleId(hour_start(now).format("%Y-%m-%d-%H").to_string())
}

pub fn next_battle_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    hour_start(now) + Duration::hours(BATTLE_LENGTH_HOURS)
}

pub fn battle_window(now: DateTime<Utc>) -> BattleWindow {
    let starts_at = hour_start(now);
    BattleWindow {
        id: current_battle_id(now),
        starts_at,
        live_until: starts_at + Duration::seconds(LIVE_WINDOW_SECS),
        ends_at: starts_at + Duration::hours(BATTLE_LENGTH_HOURS),
    }
}

pub fn battle_info(now: DateTime<Utc>) -> BattleInfo {
    let window = battle_window(now);
    let next_battle_at = next_battle_boundary(now);
    BattleInfo {
        is_live: window.is_live(now),
        seconds_until_next: (next_battle_at - now).num_seconds(),
        battle_id: window.id,
        starts_at: window.starts_at,
        live_until: window.live_until,
        ends_at: window.ends_at,
        next_battle_at,
    }
}
