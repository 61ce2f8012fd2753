use crate::error::AppError;
use crate::models::country::display_name;
use crate::services::ranking::DEFAULT_TOP_K;

const MAX_COUNTRY_NAME_LEN: usize = 64;
const MAX_LEADERBOARD_LIMIT: i64 = 100;
const RESET_CONFIRMATION: &str = "reset-all";

pub fn normalize_country_code(code: &str) -> Result<String, AppError> {
    let trimmed = code.trim();
    if (2..=3).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(AppError::BadRequest(format!("Invalid country code: {}", code)))
    }
}

pub fn validate_country_name(name: Option<&str>, code: &str) -> String {
    let trimmed = name.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        display_name(code).unwrap_or(code).to_string()
    } else {
        trimmed.chars().take(MAX_COUNTRY_NAME_LEN).collect()
    }
}

pub fn leaderboard_limit(limit: Option<i64>) -> usize {
    limit
        .unwrap_or(DEFAULT_TOP_K as i64)
        .clamp(1, MAX_LEADERBOARD_LIMIT) as usize
}

pub fn validate_reset_confirmation(confirm: &str) -> Result<(), AppError> {
    if confirm.trim() == RESET_CONFIRMATION {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Reset requires confirm = \"{}\"",
            RESET_CONFIRMATION
        )))
    }
}
