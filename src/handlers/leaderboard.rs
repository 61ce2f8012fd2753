use crate::models::leaderboard::*;
use crate::services::leaderboard_feed;
use crate::state::AppState;
use crate::validation;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn get_leaderboard(
    state: web::types::State<Arc<AppState>>,
    query: web::types::Query<LeaderboardQuery>,
) -> HttpResponse {
    let sort = query.sort.unwrap_or(SortCriterion::Total);
    let limit = validation::leaderboard_limit(query.limit);
    let snapshot = state.leaderboard.current();
    let user_country = state.user_country_code();
    let response = leaderboard_feed::leaderboard_view(&snapshot, sort, limit, user_country.as_deref());
    HttpResponse::Ok().json(&response)
}

pub async fn refresh_leaderboard(
    state: web::types::State<Arc<AppState>>,
    query: web::types::Query<LeaderboardQuery>,
) -> HttpResponse {
    let sort = query.sort.unwrap_or(SortCriterion::Total);
    let limit = validation::leaderboard_limit(query.limit);
    let snapshot = state.leaderboard.refresh(state.backend.as_ref()).await;
    let user_country = state.user_country_code();
    let response = leaderboard_feed::leaderboard_view(&snapshot, sort, limit, user_country.as_deref());
    HttpResponse::Ok().json(&response)
}

pub async fn set_polling(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<PollingRequest>,
) -> HttpResponse {
    if body.active {
        state.leaderboard.start(Arc::clone(&state.backend));
    } else {
        state.leaderboard.stop();
    }
    HttpResponse::Ok().json(&PollingStatus {
        active: state.leaderboard.is_polling(),
    })
}
