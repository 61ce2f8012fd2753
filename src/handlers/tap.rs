use crate::state::AppState;
use chrono::Utc;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn tap(state: web::types::State<Arc<AppState>>) -> HttpResponse {
    let result = state.record_tap(Utc::now());
    HttpResponse::Ok().json(&result)
}

pub async fn get_stats(state: web::types::State<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(&state.tap_stats())
}
