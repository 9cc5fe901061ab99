use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::predict::error::PredictError;

pub const MIN_LATITUDE_DEG: f64 = -90.0;
pub const MAX_LATITUDE_DEG: f64 = 90.0;
pub const MIN_LONGITUDE_DEG: f64 = -180.0;
pub const MAX_LONGITUDE_DEG: f64 = 180.0;
pub const MIN_ALTITUDE_M: f64 = 0.0;
pub const MAX_ALTITUDE_M: f64 = 10_000.0;
pub const MIN_ELEVATION_DEG: f64 = 0.0;
pub const MAX_ELEVATION_DEG: f64 = 90.0;

/// Fixed ground location a scan is computed for.
///
/// `min_elevation_deg` only gates which passes are accepted; pass
/// boundaries are always the 0° horizon crossings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ObserverSite {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    pub min_elevation_deg: f64,
}

impl Default for ObserverSite {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_m: 0.0,
            min_elevation_deg: 0.0,
        }
    }
}

impl ObserverSite {
    /// Parse a `"lat, lon"` pair as written in station configuration.
    pub fn from_coordinates(
        coordinates: &str,
        altitude_m: Option<f64>,
        min_elevation_deg: f64,
    ) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat = parts[0].parse().ok()?;
        let lon = parts[1].parse().ok()?;
        Some(Self {
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_m: altitude_m.unwrap_or(0.0),
            min_elevation_deg,
        })
    }

    /// Reject sites the scanner must never see.
    pub fn validate(&self) -> Result<(), PredictError> {
        check_range(
            "latitude",
            self.latitude_deg,
            MIN_LATITUDE_DEG,
            MAX_LATITUDE_DEG,
        )?;
        check_range(
            "longitude",
            self.longitude_deg,
            MIN_LONGITUDE_DEG,
            MAX_LONGITUDE_DEG,
        )?;
        check_range("altitude", self.altitude_m, MIN_ALTITUDE_M, MAX_ALTITUDE_M)?;
        check_range(
            "minimum elevation",
            self.min_elevation_deg,
            MIN_ELEVATION_DEG,
            MAX_ELEVATION_DEG,
        )
    }

    pub fn with_min_elevation(self, min_elevation_deg: f64) -> Self {
        Self {
            min_elevation_deg,
            ..self
        }
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        // WGS-84 constants
        let a = 6378.137;
        let e2 = 0.00669437999014;
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        [
            (n + alt_km) * cos_lat * lon.cos(),
            (n + alt_km) * cos_lat * lon.sin(),
            (n * (1.0 - e2) + alt_km) * sin_lat,
        ]
    }
}

fn check_range(what: &str, value: f64, min: f64, max: f64) -> Result<(), PredictError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(PredictError::InvalidObserver(format!(
            "{} {} outside [{}, {}]",
            what, value, min, max
        )))
    }
}
