//! Presentation adapter: a pure mapping from timer state to what is shown.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::{AfterBeep, Phase, TimerState};

/// Everything a display surface needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub phase: Phase,
    pub label: String,
    /// Remaining time as `mm:ss`.
    pub clock: String,
    pub hint: String,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub haptics_enabled: bool,
}

impl View {
    pub fn from_state(state: &TimerState, haptics_enabled: bool) -> Self {
        Self {
            phase: state.phase(),
            label: state.phase().label().to_string(),
            clock: fmt_clock(state.seconds_left()),
            hint: hint(state.phase(), state.next_after_beep()).to_string(),
            start_enabled: !state.running(),
            stop_enabled: state.running(),
            haptics_enabled,
        }
    }
}

/// Something that can show a [`View`].
pub trait Surface {
    fn draw(&mut self, view: &View);
}

/// Keeps every drawn frame in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub frames: Vec<View>,
}

impl RecordingSurface {
    pub fn last(&self) -> Option<&View> {
        self.frames.last()
    }
}

impl Surface for RecordingSurface {
    fn draw(&mut self, view: &View) {
        self.frames.push(view.clone());
    }
}

fn hint(phase: Phase, next_after_beep: AfterBeep) -> &'static str {
    match (phase, next_after_beep) {
        (Phase::Ready, _) => "Press start to begin the 20-20-20 cycle.",
        (Phase::Work, _) => "Keep working. A beep will call your next eye break.",
        (Phase::Beep, AfterBeep::Rest) => "Eye break: look at something 20 feet away.",
        (Phase::Beep, AfterBeep::Work) => "Break over, back to work.",
        (Phase::Rest, _) => "Look at something 20 feet away for 20 seconds.",
    }
}

/// Format whole seconds as `mm:ss`.
pub fn fmt_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Parse an `mm:ss` string back into whole seconds.
pub fn parse_clock(input: &str) -> Result<u64, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidClock {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (mins, secs) = input.split_once(':').ok_or_else(|| invalid("missing ':'"))?;
    if mins.is_empty() || !mins.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("minutes must be digits"));
    }
    if secs.len() != 2 || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("seconds must be two digits"));
    }

    let mins: u64 = mins.parse().map_err(|_| invalid("minutes out of range"))?;
    let secs: u64 = secs.parse().map_err(|_| invalid("seconds out of range"))?;
    if secs >= 60 {
        return Err(invalid("seconds must be below 60"));
    }
    mins.checked_mul(60)
        .and_then(|m| m.checked_add(secs))
        .ok_or_else(|| invalid("value too large"))
}
