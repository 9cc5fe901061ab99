use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::batch::{predict_schedules, BatchRequest, StationSchedule};
use crate::config::validate_days;
use crate::time_expr::TimeExpr;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PredictQuery {
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub min_elevation: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictResponse {
    pub start: DateTime<Utc>,
    pub days: u32,
    pub satellite_count: usize,
    pub pair_count: usize,
    pub schedules: Vec<StationSchedule>,
}

#[utoipa::path(
    get,
    path = "/api/predict",
    tag = "predict",
    params(
        ("days" = Option<u32>, Query, description = "Horizon in days (1-10)"),
        ("start" = Option<String>, Query, description = "Scan start: now, T+2h or RFC3339"),
        ("min_elevation" = Option<f64>, Query, description = "Override every station's minimum elevation (degrees)")
    ),
    responses(
        (status = 200, description = "Pass schedules per station", body = PredictResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 503, description = "No satellites loaded", body = ErrorResponse)
    )
)]
pub async fn list_predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
) -> ApiResult<impl IntoResponse> {
    let days = query.days.unwrap_or(state.config.predict.days);
    validate_days(days)?;

    let start = match query.start.as_deref() {
        Some(expr) => TimeExpr::parse(expr)?,
        None => state.config.predict.start,
    }
    .resolve(Utc::now());

    let mut stations = state.stations.as_ref().clone();
    if let Some(min_el) = query.min_elevation {
        for station in &mut stations {
            station.site = station.site.with_min_elevation(min_el);
            station.site.validate()?;
        }
    }

    let loader = state.tle_loader.clone().read_owned().await;
    let satellite_count = loader.satellites().len();
    if satellite_count == 0 {
        return Err(ApiError::Unavailable("no_satellites_loaded"));
    }
    let pair_count = satellite_count * stations.len();

    let request = BatchRequest {
        start,
        days,
        workers: state.config.predict.workers,
    };

    let schedules = tokio::task::spawn_blocking(move || {
        let targets = loader.satellites();
        predict_schedules(&targets, &stations, &request, |p| {
            log::debug!("predict progress {}/{}", p.completed, p.total)
        })
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(PredictResponse {
            start,
            days,
            satellite_count,
            pair_count,
            schedules,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::predict::{predict_satellite_passes, TleLoader};
    use axum::body::to_bytes;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::RwLock;

    const ISS: &str = "ISS (ZARYA)
1 25544U 98067A   25278.49802050  .00011384  00000+0  20935-3 0  9990
2 25544  51.6327 120.3420 0000884 206.2421 153.8523 15.49697304532279
";

    fn app_state(dir: &TempDir, with_tle: bool) -> AppState {
        if with_tle {
            std::fs::write(dir.path().join("stations.tle"), ISS).unwrap();
        }
        let yaml = format!(
            r#"
stations:
  - id: paris
    name: Paris
    coordinates: "48.8566, 2.3522"
    altitude_m: 35
tle:
  folder: "{}"
predict:
  days: 1
  start: "2025-10-05T12:00:00Z"
"#,
            dir.path().display()
        );
        let config = Config::from_str(&yaml).unwrap();
        let stations = config.stations().unwrap();
        let mut loader = TleLoader::new(config.tle.folder.clone());
        loader.load_all().unwrap();

        AppState {
            config: Arc::new(config),
            stations: Arc::new(stations),
            tle_loader: Arc::new(RwLock::new(loader)),
        }
    }

    fn query(days: Option<u32>, start: Option<&str>, min_elevation: Option<f64>) -> PredictQuery {
        PredictQuery {
            days,
            start: start.map(str::to_string),
            min_elevation,
        }
    }

    async fn call(state: AppState, query: PredictQuery) -> (StatusCode, serde_json::Value) {
        let response = list_predictions(State(state), Query(query))
            .await
            .into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn rejects_days_outside_range() {
        let dir = TempDir::new().unwrap();
        let (status, body) = call(app_state(&dir, true), query(Some(11), None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");

        let (status, _) = call(app_state(&dir, true), query(Some(0), None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_unparsable_start() {
        let dir = TempDir::new().unwrap();
        let (status, body) =
            call(app_state(&dir, true), query(None, Some("yesterday"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn rejects_min_elevation_outside_range() {
        let dir = TempDir::new().unwrap();
        for bad in [95.0, -1.0] {
            let (status, body) = call(app_state(&dir, true), query(None, None, Some(bad))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "validation_failed");
        }
    }

    #[tokio::test]
    async fn unavailable_without_satellites() {
        let dir = TempDir::new().unwrap();
        let (status, body) = call(app_state(&dir, false), query(None, None, None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "no_satellites_loaded");
    }

    #[tokio::test]
    async fn min_elevation_override_reaches_every_station() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir, true);
        let site = state.stations[0].site;
        let start = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap();
        let orbit = state.tle_loader.read().await.satellites()[0]
            .orbital_state()
            .unwrap();

        for (min_elevation, override_value) in [(20.0, None), (0.0, Some(0.0)), (45.0, Some(45.0))]
        {
            let expected =
                predict_satellite_passes(&orbit, &site.with_min_elevation(min_elevation), start, 1);

            let (status, body) = call(state.clone(), query(None, None, override_value)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["days"], 1);
            assert_eq!(body["satellite_count"], 1);
            assert_eq!(body["pair_count"], 1);

            let passes = body["schedules"][0]["passes"].as_array().unwrap();
            assert_eq!(passes.len(), expected.len(), "min elevation {}", min_elevation);
            for (got, want) in passes.iter().zip(&expected) {
                assert_eq!(got["station_id"], "paris");
                assert_eq!(got["norad_id"], 25544);
                assert_eq!(got["start"], serde_json::to_value(want.start).unwrap());
                let peak = got["peak_elevation_deg"].as_f64().unwrap();
                assert!((peak - want.peak_elevation_deg).abs() < 1e-9);
                assert!(peak >= min_elevation);
            }
        }
    }
}
