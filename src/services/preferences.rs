use crate::db::Db;
use crate::error::AppError;
use crate::models::country::{Country, DetectionMethod, UserCountry};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tracing::{info, warn};
use uuid::Uuid;

const USER_ID_KEY: &str = "user_id";
const USER_COUNTRY_KEY: &str = "user_country";
const TOTAL_TAPS_KEY: &str = "total_taps_all_time";

fn get(db: &Db, key: &str) -> Result<Option<String>, AppError> {
    Ok(db.with_conn(|conn| {
        conn.query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
    })?)
}

fn set(db: &Db, key: &str, value: &str) -> Result<(), AppError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            params![key, value],
        )
    })?;
    Ok(())
}

pub fn user_id(db: &Db) -> Result<String, AppError> {
    let candidate = Uuid::new_v4().to_string();
    Ok(db.with_conn(|conn| {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO preferences (key, value) VALUES (?1, ?2)",
            params![USER_ID_KEY, candidate],
        )?;
        if inserted > 0 {
            info!(user_id = %candidate, "created anonymous user id");
        }
        conn.query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            params![USER_ID_KEY],
            |row| row.get(0),
        )
    })?)
}

pub fn stored_country(db: &Db) -> Result<Option<UserCountry>, AppError> {
    let Some(raw) = get(db, USER_COUNTRY_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<UserCountry>(&raw) {
        Ok(stored) => Ok(Some(stored)),
        Err(e) => {
            warn!(error = %e, "ignoring undecodable stored country");
            Ok(None)
        }
    }
}

pub fn save_country(db: &Db, country: Country, method: DetectionMethod) -> Result<UserCountry, AppError> {
    let stored = UserCountry {
        country,
        confirmed_at: Utc::now(),
        detection_method: method,
    };
    let encoded = serde_json::to_string(&stored).map_err(|e| AppError::Internal(e.to_string()))?;
    set(db, USER_COUNTRY_KEY, &encoded)?;
    Ok(stored)
}

pub fn total_taps(db: &Db) -> Result<u64, AppError> {
    Ok(get(db, TOTAL_TAPS_KEY)?
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0))
}

// Never lowers the stored counter, whatever order the writes land in.
pub fn save_total_taps(db: &Db, total: u64) -> Result<(), AppError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = CAST(MAX(CAST(value AS INTEGER), CAST(excluded.value AS INTEGER)) AS TEXT),
                updated_at = datetime('now')",
            params![TOTAL_TAPS_KEY, total.to_string()],
        )
    })?;
    Ok(())
}
