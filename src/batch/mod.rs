mod orchestrator;
mod types;

pub use orchestrator::{predict_schedules, run, run_parallel};
pub use types::{BatchRequest, Progress, Station, StationSchedule, TaggedPass, Target};
