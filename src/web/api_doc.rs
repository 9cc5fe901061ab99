use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::predict::{PredictQuery, PredictResponse};
use super::api::status::{HealthResponse, ReloadResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::predict::list_predictions,
        super::api::status::health,
        super::api::status::list_satellites,
        super::api::status::list_stations,
        super::api::status::reload_tle,
    ),
    components(
        schemas(
            PredictQuery,
            PredictResponse,
            HealthResponse,
            ReloadResponse,
            ErrorResponse,
            crate::batch::Station,
            crate::batch::StationSchedule,
            crate::batch::TaggedPass,
            crate::predict::Pass,
            crate::predict::CompassPoint,
            crate::predict::ObserverSite,
            crate::predict::SatelliteInfo,
        )
    ),
    info(
        title = "Pass-O-Mat Prediction API",
        description = "Satellite pass predictions for configured ground stations",
        version = "0.1.0"
    ),
    tags(
        (name = "predict", description = "Pass prediction"),
        (name = "status", description = "Service status and loaded data")
    )
)]
pub struct ApiDoc;
