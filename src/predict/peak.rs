use chrono::{DateTime, Duration, Utc};

use crate::predict::probe::LookAngleProbe;
use crate::predict::types::LookAngleSample;

const COARSE_INTERVALS: i32 = 50;
const FINE_INTERVALS: i32 = 60;

/// Highest elevation between `start` and `end`, both inclusive.
///
/// A 51-point grid over the whole window seeds a 61-point grid spanning one
/// coarse step either side of the coarse maximum. The fine window is clamped
/// to `[start, end]`. Returns `None` if no grid point had a solution.
pub fn find_peak<P: LookAngleProbe>(
    probe: &P,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<LookAngleSample> {
    let coarse_step = (end - start) / COARSE_INTERVALS;
    let coarse = grid_max(probe, start, coarse_step, COARSE_INTERVALS, None)?;

    let window_start = (coarse.at - coarse_step).max(start);
    let window_end = (coarse.at + coarse_step).min(end);
    let fine_step = (window_end - window_start) / FINE_INTERVALS;

    grid_max(probe, window_start, fine_step, FINE_INTERVALS, Some(coarse))
}

fn grid_max<P: LookAngleProbe>(
    probe: &P,
    from: DateTime<Utc>,
    step: Duration,
    intervals: i32,
    seed: Option<LookAngleSample>,
) -> Option<LookAngleSample> {
    (0..=intervals)
        .filter_map(|i| probe.sample(from + step * i))
        .fold(seed, |best, sample| match best {
            Some(b) if b.elevation_deg >= sample.elevation_deg => Some(b),
            _ => Some(sample),
        })
}
