use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{AfterBeep, Phase};

/// Every state change in the system produces an Event.
/// The driver logs them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A phase window began at `at` and ends at `ends_at_ms`.
    PhaseStarted {
        phase: Phase,
        next_after_beep: AfterBeep,
        duration_secs: u64,
        ends_at_ms: i64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    /// Diagnostic alert fired outside the cycle.
    TestAlert {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        running: bool,
        seconds_left: u64,
        total_secs: u64,
        phase_end_at_ms: Option<i64>,
        next_after_beep: AfterBeep,
        at: DateTime<Utc>,
    },
}
