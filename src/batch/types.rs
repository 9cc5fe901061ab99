use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::{ObserverSite, Pass, SatelliteInfo, TleEntry};

/// A named observing station.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Station {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub site: ObserverSite,
}

/// Anything the orchestrator can scan for passes.
pub trait Target {
    fn info(&self) -> &SatelliteInfo;
}

impl Target for TleEntry {
    fn info(&self) -> &SatelliteInfo {
        &self.info
    }
}

impl<T: Target + ?Sized> Target for &T {
    fn info(&self) -> &SatelliteInfo {
        (**self).info()
    }
}

/// A pass labelled with the satellite and station it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TaggedPass {
    pub satellite: String,
    pub norad_id: u32,
    pub station_id: String,
    pub station_name: String,
    #[serde(flatten)]
    pub pass: Pass,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StationSchedule {
    pub station_id: String,
    pub station_name: String,
    /// Ascending by start time.
    pub passes: Vec<TaggedPass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchRequest {
    pub start: DateTime<Utc>,
    pub days: u32,
    pub workers: usize,
}
