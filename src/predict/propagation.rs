use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;

/// Position and velocity in the TEME frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// SGP4 elements of one target, ready to propagate.
pub struct OrbitalState {
    elements: Elements,
    constants: Constants,
}

impl OrbitalState {
    pub fn from_elements(elements: Elements) -> Result<Self, PredictError> {
        let constants = Constants::from_elements(&elements)?;
        Ok(Self {
            elements,
            constants,
        })
    }

    /// `None` when SGP4 cannot produce a physical state at `at`.
    pub fn propagate(&self, at: DateTime<Utc>) -> Option<StateVector> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&at.naive_utc())
            .ok()?;

        let prediction = match self.constants.propagate(minutes) {
            Ok(p) => p,
            Err(e) => {
                log::trace!("propagation failed at {}: {}", at, e);
                return None;
            }
        };

        let finite = prediction
            .position
            .iter()
            .chain(prediction.velocity.iter())
            .all(|v| v.is_finite());
        if !finite {
            return None;
        }

        Some(StateVector {
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        })
    }
}

/// Greenwich sidereal angle (radians) used to rotate TEME into Earth-fixed.
pub fn sidereal_angle(at: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&at.naive_utc()))
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}
