use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::predict::TleLoader;

use super::api::predict as predict_handlers;
use super::api::status as status_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(status_handlers::health))
        .route("/api/satellites", get(status_handlers::list_satellites))
        .route("/api/stations", get(status_handlers::list_stations))
        .route("/api/tle/reload", post(status_handlers::reload_tle))
        .route("/api/predict", get(predict_handlers::list_predictions))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let stations = config
        .stations()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let mut loader = TleLoader::new(config.tle.folder.clone());
    if let Err(e) = loader.load_all() {
        log::warn!("Failed to initialize TLE loader: {}", e);
    }

    let state = AppState {
        config: Arc::new(config),
        stations: Arc::new(stations),
        tle_loader: Arc::new(RwLock::new(loader)),
    };

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, router(state)).await
}
