use chrono::{DateTime, Duration, Utc};

use crate::predict::probe::LookAngleProbe;

pub const HORIZON_ELEVATION: f64 = 0.0;
const MAX_ITERATIONS: usize = 20;
const MIN_BRACKET: Duration = Duration::milliseconds(100);

/// Binary search for the horizon crossing between `before` and `after`.
///
/// The two instants must straddle 0° in the direction given by `rising`.
/// Returns the last probed instant known to be above the horizon: the
/// `after` side of the final bracket when rising, the `before` side when
/// setting. A probe without a solution ends the search early with the
/// current bracket.
pub fn refine_crossing<P: LookAngleProbe>(
    probe: &P,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    rising: bool,
) -> DateTime<Utc> {
    let mut low = before;
    let mut high = after;

    for _ in 0..MAX_ITERATIONS {
        let mid = low + (high - low) / 2;
        let Some(sample) = probe.sample(mid) else {
            break;
        };

        let above = sample.elevation_deg >= HORIZON_ELEVATION;
        match (rising, above) {
            (true, true) | (false, false) => high = mid,
            (true, false) | (false, true) => low = mid,
        }

        if high - low < MIN_BRACKET {
            break;
        }
    }

    if rising {
        high
    } else {
        low
    }
}
