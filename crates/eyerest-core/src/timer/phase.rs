use serde::{Deserialize, Serialize};

/// Nominal Work window in seconds.
pub const WORK_SECS: u64 = 20 * 60;
/// Nominal Rest window in seconds.
pub const REST_SECS: u64 = 20;
/// Nominal Beep window in seconds.
pub const BEEP_SECS: u64 = 3;

/// Segment of the 20-20-20 cycle.
///
/// `Ready` is both the initial and the stopped state; `Work`, `Beep` and
/// `Rest` repeat while the timer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Ready,
    Work,
    Rest,
    Beep,
}

impl Phase {
    /// Nominal duration in seconds. Ready shows the Work window it leads to.
    pub fn duration_secs(self) -> u64 {
        match self {
            Phase::Ready | Phase::Work => WORK_SECS,
            Phase::Rest => REST_SECS,
            Phase::Beep => BEEP_SECS,
        }
    }

    /// Nominal duration in milliseconds.
    pub fn duration_ms(self) -> i64 {
        self.duration_secs().saturating_mul(1000) as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Ready => "Ready",
            Phase::Work => "Work",
            Phase::Rest => "Rest",
            Phase::Beep => "Beep",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the cycle resumes once a Beep window elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfterBeep {
    Work,
    Rest,
}

impl From<AfterBeep> for Phase {
    fn from(next: AfterBeep) -> Self {
        match next {
            AfterBeep::Work => Phase::Work,
            AfterBeep::Rest => Phase::Rest,
        }
    }
}

/// One row of the transition table: the phase entered when `current`
/// elapses, and the resume target recorded alongside it.
pub fn successor(current: Phase, next_after_beep: AfterBeep) -> (Phase, AfterBeep) {
    match current {
        Phase::Work => (Phase::Beep, AfterBeep::Rest),
        Phase::Rest => (Phase::Beep, AfterBeep::Work),
        Phase::Beep => (next_after_beep.into(), next_after_beep),
        Phase::Ready => (Phase::Work, AfterBeep::Rest),
    }
}
