use chrono::{DateTime, Utc};

use crate::predict::look_angles::look_angles;
use crate::predict::observer::ObserverSite;
use crate::predict::propagation::OrbitalState;
use crate::predict::types::LookAngleSample;

/// Look angles at arbitrary instants, in any order.
///
/// `None` means the angle is unknown at that instant, not that the target
/// is below the horizon.
pub trait LookAngleProbe {
    fn sample(&self, at: DateTime<Utc>) -> Option<LookAngleSample>;
}

impl<F> LookAngleProbe for F
where
    F: Fn(DateTime<Utc>) -> Option<LookAngleSample>,
{
    fn sample(&self, at: DateTime<Utc>) -> Option<LookAngleSample> {
        self(at)
    }
}

/// SGP4 propagation followed by the topocentric transform.
pub struct SatelliteProbe<'a> {
    state: &'a OrbitalState,
    site: ObserverSite,
}

impl<'a> SatelliteProbe<'a> {
    pub fn new(state: &'a OrbitalState, site: ObserverSite) -> Self {
        Self { state, site }
    }
}

impl LookAngleProbe for SatelliteProbe<'_> {
    fn sample(&self, at: DateTime<Utc>) -> Option<LookAngleSample> {
        let state = self.state.propagate(at)?;
        let angles = look_angles(&self.site, &state, at)?;
        Some(LookAngleSample {
            at,
            elevation_deg: angles.elevation_deg,
            azimuth_deg: angles.azimuth_deg,
        })
    }
}
