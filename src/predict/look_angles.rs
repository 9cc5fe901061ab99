use chrono::{DateTime, Utc};

use crate::predict::observer::ObserverSite;
use crate::predict::propagation::{sidereal_angle, teme_to_ecef_position, StateVector};

/// Topocentric direction to a target. No refraction correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
}

/// Look angles from `site` to a TEME state at instant `at`.
pub fn look_angles(
    site: &ObserverSite,
    state: &StateVector,
    at: DateTime<Utc>,
) -> Option<LookAngles> {
    let sat_ecef = teme_to_ecef_position(state.position_km, sidereal_angle(at));
    let sta_ecef = site.position_ecef_km();

    let dr = [
        sat_ecef[0] - sta_ecef[0],
        sat_ecef[1] - sta_ecef[1],
        sat_ecef[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();
    if !range_km.is_finite() || range_km <= 0.0 {
        return None;
    }

    let (east, north, up) = ecef_to_enu(dr, site.lat_rad(), site.lon_rad());
    let elevation_deg = (up / range_km).clamp(-1.0, 1.0).asin().to_degrees();
    let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);

    Some(LookAngles {
        elevation_deg,
        azimuth_deg,
        range_km,
    })
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}
