use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

/// Information about a single satellite from TLE
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u32,
    pub tle_source: String,
}

/// Elevation and azimuth of a target at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngleSample {
    pub at: DateTime<Utc>,
    /// Negative below the horizon.
    pub elevation_deg: f64,
    /// [0, 360)
    pub azimuth_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, ToSchema)]
pub enum CompassPoint {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassPoint {
    const POINTS: [CompassPoint; 8] = [
        CompassPoint::N,
        CompassPoint::NE,
        CompassPoint::E,
        CompassPoint::SE,
        CompassPoint::S,
        CompassPoint::SW,
        CompassPoint::W,
        CompassPoint::NW,
    ];

    /// Bucket an azimuth into one of 8 points: `round(az / 45) mod 8`.
    pub fn from_azimuth(azimuth_deg: f64) -> Self {
        let index = (azimuth_deg / 45.0).round().rem_euclid(8.0) as usize;
        Self::POINTS[index % 8]
    }
}

/// A predicted satellite pass
///
/// `start` and `end` are the 0° horizon crossings, except when the pass was
/// already in progress when the scan began or still in progress when it
/// ended; then they are the scan's first or last instant.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Pass {
    pub start: DateTime<Utc>,
    pub peak: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub peak_elevation_deg: f64,
    pub start_azimuth_deg: f64,
    pub end_azimuth_deg: f64,
    pub start_compass: CompassPoint,
    pub end_compass: CompassPoint,
}

impl Pass {
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compass_buckets() {
        assert_eq!(CompassPoint::from_azimuth(0.0), CompassPoint::N);
        assert_eq!(CompassPoint::from_azimuth(22.4), CompassPoint::N);
        assert_eq!(CompassPoint::from_azimuth(22.5), CompassPoint::NE);
        assert_eq!(CompassPoint::from_azimuth(90.0), CompassPoint::E);
        assert_eq!(CompassPoint::from_azimuth(200.0), CompassPoint::S);
        assert_eq!(CompassPoint::from_azimuth(292.0), CompassPoint::W);
        assert_eq!(CompassPoint::from_azimuth(315.0), CompassPoint::NW);
        // wraps back to north
        assert_eq!(CompassPoint::from_azimuth(350.0), CompassPoint::N);
        assert_eq!(CompassPoint::from_azimuth(359.9), CompassPoint::N);
    }

    #[test]
    fn compass_labels() {
        assert_eq!(CompassPoint::SW.to_string(), "SW");
        assert_eq!(serde_json::to_string(&CompassPoint::NE).unwrap(), "\"NE\"");
    }
}
