use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::batch::Station;
use crate::predict::SatelliteInfo;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub satellites: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReloadResponse {
    pub satellites: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "status",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let satellites = state.tle_loader.read().await.satellites().len();
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        satellites,
    })
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    tag = "status",
    responses((status = 200, description = "Loaded satellites", body = Vec<SatelliteInfo>))
)]
pub async fn list_satellites(State(state): State<AppState>) -> Json<Vec<SatelliteInfo>> {
    let loader = state.tle_loader.read().await;
    Json(loader.satellites().into_iter().map(|s| s.info.clone()).collect())
}

#[utoipa::path(
    get,
    path = "/api/stations",
    tag = "status",
    responses((status = 200, description = "Configured stations", body = Vec<Station>))
)]
pub async fn list_stations(State(state): State<AppState>) -> Json<Vec<Station>> {
    Json(state.stations.as_ref().clone())
}

#[utoipa::path(
    post,
    path = "/api/tle/reload",
    tag = "status",
    responses(
        (status = 200, description = "TLE folder reloaded", body = ReloadResponse),
        (status = 500, description = "TLE folder could not be read", body = ErrorResponse)
    )
)]
pub async fn reload_tle(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    let mut loader = state.tle_loader.write().await;
    loader.reload()?;
    Ok(Json(ReloadResponse {
        satellites: loader.satellites().len(),
    }))
}
