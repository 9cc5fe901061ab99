use chrono::{DateTime, Duration, Utc};

use crate::predict::crossing::{refine_crossing, HORIZON_ELEVATION};
use crate::predict::observer::ObserverSite;
use crate::predict::peak::find_peak;
use crate::predict::probe::{LookAngleProbe, SatelliteProbe};
use crate::predict::propagation::OrbitalState;
use crate::predict::types::{CompassPoint, LookAngleSample, Pass};

pub const COARSE_STEP_SECONDS: i64 = 5;

/// Pass being tracked between its rising crossing and its setting crossing.
#[derive(Debug, Clone, Copy)]
struct PassCandidate {
    start: DateTime<Utc>,
    start_azimuth_deg: f64,
    /// Highest coarse sample so far. Only a fallback for the peak search.
    coarse_max: LookAngleSample,
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Idle,
    InPass(PassCandidate),
}

/// Steps through a horizon in fixed coarse increments and turns horizon
/// crossings into passes for one target/observer pair.
pub struct PassScanner<'a, P> {
    probe: &'a P,
    site: ObserverSite,
    state: ScanState,
    /// Last sample that had a solution.
    previous: Option<LookAngleSample>,
    passes: Vec<Pass>,
}

impl<'a, P: LookAngleProbe> PassScanner<'a, P> {
    pub fn new(probe: &'a P, site: ObserverSite) -> Self {
        Self {
            probe,
            site,
            state: ScanState::Idle,
            previous: None,
            passes: Vec::new(),
        }
    }

    /// Sample `start + k * 5s` for every `k` with `k * 5s <= horizon`.
    pub fn scan(mut self, start: DateTime<Utc>, horizon: Duration) -> Vec<Pass> {
        let steps = horizon.num_seconds() / COARSE_STEP_SECONDS;
        let mut last = start;

        for k in 0..=steps {
            let at = start + Duration::seconds(k * COARSE_STEP_SECONDS);
            last = at;
            if let Some(sample) = self.probe.sample(at) {
                self.advance(sample);
            }
        }

        // Still above the horizon when the scan ran out
        if let ScanState::InPass(candidate) = self.state {
            let end_azimuth = self
                .previous
                .map(|p| p.azimuth_deg)
                .unwrap_or(candidate.start_azimuth_deg);
            self.emit(candidate, last, end_azimuth);
        }

        log::debug!(
            "scan from {} over {}s found {} passes",
            start,
            horizon.num_seconds(),
            self.passes.len()
        );
        self.passes
    }

    fn advance(&mut self, sample: LookAngleSample) {
        let above = sample.elevation_deg >= HORIZON_ELEVATION;

        self.state = match (self.state, above) {
            (ScanState::Idle, false) => ScanState::Idle,
            (ScanState::Idle, true) => ScanState::InPass(self.open(sample)),
            (ScanState::InPass(mut candidate), true) => {
                if sample.elevation_deg > candidate.coarse_max.elevation_deg {
                    candidate.coarse_max = sample;
                }
                ScanState::InPass(candidate)
            }
            (ScanState::InPass(candidate), false) => {
                self.close(candidate, sample);
                ScanState::Idle
            }
        };

        self.previous = Some(sample);
    }

    fn open(&self, sample: LookAngleSample) -> PassCandidate {
        let (start, start_azimuth_deg) = match self.previous {
            Some(prev) => {
                let start = refine_crossing(self.probe, prev.at, sample.at, true);
                (start, self.azimuth_at(start).unwrap_or(sample.azimuth_deg))
            }
            // Rose before the scan began; the real start is unknown.
            None => (sample.at, sample.azimuth_deg),
        };

        PassCandidate {
            start,
            start_azimuth_deg,
            coarse_max: sample,
        }
    }

    fn close(&mut self, candidate: PassCandidate, sample: LookAngleSample) {
        let (end, end_azimuth) = match self.previous {
            Some(prev) => {
                let end = refine_crossing(self.probe, prev.at, sample.at, false);
                (end, self.azimuth_at(end).unwrap_or(sample.azimuth_deg))
            }
            None => (sample.at, sample.azimuth_deg),
        };
        self.emit(candidate, end, end_azimuth);
    }

    fn emit(&mut self, candidate: PassCandidate, end: DateTime<Utc>, end_azimuth_deg: f64) {
        let peak = find_peak(self.probe, candidate.start, end).unwrap_or(candidate.coarse_max);

        if peak.elevation_deg < self.site.min_elevation_deg {
            log::debug!(
                "discarding pass at {}: peak {:.2}° below minimum {:.2}°",
                candidate.start,
                peak.elevation_deg,
                self.site.min_elevation_deg
            );
            return;
        }

        self.passes.push(Pass {
            start: candidate.start,
            peak: peak.at,
            end,
            peak_elevation_deg: peak.elevation_deg,
            start_azimuth_deg: candidate.start_azimuth_deg,
            end_azimuth_deg,
            start_compass: CompassPoint::from_azimuth(candidate.start_azimuth_deg),
            end_compass: CompassPoint::from_azimuth(end_azimuth_deg),
        });
    }

    fn azimuth_at(&self, at: DateTime<Utc>) -> Option<f64> {
        self.probe.sample(at).map(|s| s.azimuth_deg)
    }
}

/// Find all passes over `site` during `horizon_days` days from `start`.
pub fn predict_passes<P: LookAngleProbe>(
    probe: &P,
    site: &ObserverSite,
    start: DateTime<Utc>,
    horizon_days: u32,
) -> Vec<Pass> {
    PassScanner::new(probe, *site).scan(start, Duration::days(i64::from(horizon_days)))
}

/// [`predict_passes`] for an SGP4 target.
pub fn predict_satellite_passes(
    state: &OrbitalState,
    site: &ObserverSite,
    start: DateTime<Utc>,
    horizon_days: u32,
) -> Vec<Pass> {
    let probe = SatelliteProbe::new(state, *site);
    predict_passes(&probe, site, start, horizon_days)
}
