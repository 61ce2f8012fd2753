use std::time::Duration;
use thiserror::Error;

const DEFAULT_GEOLOCATION_URL: &str = "https://ipapi.co/json/";
const DEFAULT_LEADERBOARD_VIEW: &str = "current_leaderboard";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub geolocation_url: String,
    pub leaderboard_view: String,
    pub leaderboard_fetch_limit: u32,
    pub poll_interval: Duration,
    pub tap_batch_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let parsed = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(name) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid { name, value }),
                None => Ok(default),
            }
        };

        let port = parsed("PORT", 3002)?;
        let port = u16::try_from(port).map_err(|_| ConfigError::Invalid {
            name: "PORT",
            value: port.to_string(),
        })?;

        let poll_secs = parsed("LEADERBOARD_POLL_SECS", 5)?;
        let tap_batch_size = parsed("TAP_BATCH_SIZE", 10)?;
        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "LEADERBOARD_POLL_SECS",
                value: "0".into(),
            });
        }
        if tap_batch_size == 0 || tap_batch_size > u64::from(u32::MAX) {
            return Err(ConfigError::Invalid {
                name: "TAP_BATCH_SIZE",
                value: tap_batch_size.to_string(),
            });
        }

        Ok(Config {
            supabase_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "tapwar.db".into()),
            geolocation_url: lookup("GEOLOCATION_URL")
                .unwrap_or_else(|| DEFAULT_GEOLOCATION_URL.into()),
            leaderboard_view: lookup("LEADERBOARD_VIEW")
                .unwrap_or_else(|| DEFAULT_LEADERBOARD_VIEW.into()),
            leaderboard_fetch_limit: parsed("LEADERBOARD_FETCH_LIMIT", 50)?.clamp(1, 1000) as u32,
            poll_interval: Duration::from_secs(poll_secs),
            tap_batch_size: tap_batch_size as u32,
        })
    }
}
