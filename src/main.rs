mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod state;
mod validation;

use config::Config;
use db::Db;
use ntex::web;
use ntex_cors::Cors;
use services::backend::SupabaseBackend;
use services::geolocation::IpGeolocator;
use state::AppState;
use std::io;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[ntex::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let db = Db::open(&config.database_path).map_err(io::Error::other)?;
    let backend = SupabaseBackend::new(&config).map_err(io::Error::other)?;
    let geolocator = IpGeolocator::new(&config.geolocation_url).map_err(io::Error::other)?;
    let bind = format!("{}:{}", config.host, config.port);

    let state = Arc::new(
        AppState::new(&config, db, Arc::new(backend), Arc::new(geolocator)).map_err(io::Error::other)?,
    );
    state.leaderboard.start(Arc::clone(&state.backend));

    let mut updates = state.leaderboard.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            debug!(
                countries = snapshot.standings.len(),
                failed = snapshot.failed,
                "leaderboard snapshot published"
            );
        }
    });

    info!(%bind, "TapWar client starting");

    let server_state = Arc::clone(&state);
    web::HttpServer::new(move || {
        web::App::new()
            .state(server_state.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            .route("/api/health", web::get().to(health))
            // Battle clock
            .route("/api/battle", web::get().to(handlers::battle::get_battle))
            // Tapping
            .route("/api/tap", web::post().to(handlers::tap::tap))
            .route("/api/stats", web::get().to(handlers::tap::get_stats))
            // Leaderboard
            .route("/api/leaderboard", web::get().to(handlers::leaderboard::get_leaderboard))
            .route("/api/leaderboard/refresh", web::post().to(handlers::leaderboard::refresh_leaderboard))
            .route("/api/leaderboard/polling", web::put().to(handlers::leaderboard::set_polling))
            // Country
            .route("/api/countries", web::get().to(handlers::country::list_countries))
            .route("/api/country", web::get().to(handlers::country::get_country))
            .route("/api/country", web::put().to(handlers::country::confirm_country))
            .route("/api/country/detect", web::post().to(handlers::country::detect_country))
            // Admin
            .route("/api/admin/reset", web::post().to(handlers::admin::reset_all))
    })
    .bind(bind)?
    .run()
    .await?;

    state.shutdown().map_err(io::Error::other)
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
