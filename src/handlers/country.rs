use crate::error::AppError;
use crate::models::country::*;
use crate::services::preferences;
use crate::state::AppState;
use crate::validation;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;
use tracing::warn;

pub async fn list_countries() -> HttpResponse {
    let countries: Vec<CountryView> = known_countries().iter().map(CountryView::from).collect();
    HttpResponse::Ok().json(&countries)
}

pub async fn get_country(state: web::types::State<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    match preferences::stored_country(&state.db)? {
        Some(stored) => Ok(HttpResponse::Ok().json(&UserCountryView::from(&stored))),
        None => Err(AppError::NotFound("No country confirmed yet".into())),
    }
}

pub async fn confirm_country(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<CountrySelection>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let code = validation::normalize_country_code(&req.code)?;
    let name = validation::validate_country_name(req.name.as_deref(), &code);
    let method = req.method.unwrap_or(DetectionMethod::Manual);
    let stored = state.confirm_country(Country::new(&code, &name), method)?;
    Ok(HttpResponse::Ok().json(&UserCountryView::from(&stored)))
}

pub async fn detect_country(state: web::types::State<Arc<AppState>>) -> HttpResponse {
    let result = match state.geolocator.detect_country().await {
        Ok(country) => DetectionResult {
            detected: true,
            candidate: Some(CountryView::from(&country)),
        },
        Err(e) => {
            warn!(error = %e, "country detection failed, manual selection required");
            DetectionResult {
                detected: false,
                candidate: None,
            }
        }
    };
    HttpResponse::Ok().json(&result)
}
