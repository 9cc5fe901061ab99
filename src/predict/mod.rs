mod crossing;
mod error;
mod look_angles;
mod observer;
mod pass_finder;
mod peak;
mod probe;
mod propagation;
mod tle_loader;
mod types;

pub use crossing::{refine_crossing, HORIZON_ELEVATION};
pub use error::PredictError;
pub use look_angles::{look_angles, LookAngles};
pub use observer::ObserverSite;
pub use pass_finder::{
    predict_passes, predict_satellite_passes, PassScanner, COARSE_STEP_SECONDS,
};
pub use peak::find_peak;
pub use probe::{LookAngleProbe, SatelliteProbe};
pub use propagation::{OrbitalState, StateVector};
pub use tle_loader::{parse_tle_entries, TleEntry, TleLoader};
pub use types::{CompassPoint, LookAngleSample, Pass, SatelliteInfo};
