mod engine;
mod phase;

pub use engine::{PhaseEngine, TimerState};
pub use phase::{successor, AfterBeep, Phase, BEEP_SECS, REST_SECS, WORK_SECS};
