use crate::error::AppError;
use crate::models::leaderboard::{ResetRequest, ResetResult};
use crate::state::AppState;
use crate::validation;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;
use tracing::warn;

pub async fn reset_all(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<ResetRequest>,
) -> Result<HttpResponse, AppError> {
    validation::validate_reset_confirmation(&body.confirm)?;
    warn!("resetting all backend stats");
    state.backend.reset_all().await?;
    state.leaderboard.refresh(state.backend.as_ref()).await;
    Ok(HttpResponse::Ok().json(&ResetResult { reset: true }))
}
