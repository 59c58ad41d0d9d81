//! Phase engine implementation.
//!
//! The engine is a wall-clock-based state machine. It holds an absolute
//! phase-end timestamp instead of a countdown, so the remaining time is
//! always derived from the clock and missed ticks cost nothing. It does not
//! use internal threads - the caller samples `now` and invokes `advance()`.
//!
//! ## State Transitions
//!
//! ```text
//! Ready -> Work -> Beep -> Rest -> Beep -> Work -> ...
//!   ^                                              |
//!   +------------------- stop() -------------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PhaseEngine::new();
//! engine.start(clock.now_ms(), &mut alerts);
//! // On every frame / poll / focus regain:
//! let events = engine.advance(clock.now_ms(), &mut alerts);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::phase::{successor, AfterBeep, Phase};
use crate::alert::AlertSink;
use crate::clock::to_datetime;
use crate::events::Event;

/// The single timer entity.
///
/// `phase_end_at_ms` is authoritative; `seconds_left` is a display value
/// refreshed on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    phase: Phase,
    seconds_left: u64,
    phase_end_at_ms: Option<i64>,
    next_after_beep: AfterBeep,
    running: bool,
}

impl TimerState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_left(&self) -> u64 {
        self.seconds_left
    }

    pub fn phase_end_at_ms(&self) -> Option<i64> {
        self.phase_end_at_ms
    }

    pub fn next_after_beep(&self) -> AfterBeep {
        self.next_after_beep
    }

    pub fn running(&self) -> bool {
        self.running
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            phase: Phase::Ready,
            seconds_left: Phase::Work.duration_secs(),
            phase_end_at_ms: None,
            next_after_beep: AfterBeep::Rest,
            running: false,
        }
    }
}

/// Core phase engine.
///
/// Operates on absolute timestamps -- no internal thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseEngine {
    state: TimerState,
}

impl PhaseEngine {
    /// Create an engine in the Ready state.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Whole seconds left in the current phase, rounded up.
    ///
    /// Pure: does not touch the stored `seconds_left`.
    pub fn remaining(&self, now_ms: i64) -> u64 {
        match self.state.phase_end_at_ms {
            Some(end) => ceil_secs(end.saturating_sub(now_ms)),
            None => self.state.seconds_left,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now_ms: i64) -> Event {
        Event::StateSnapshot {
            phase: self.state.phase,
            running: self.state.running,
            seconds_left: self.remaining(now_ms),
            total_secs: self.state.phase.duration_secs(),
            phase_end_at_ms: self.state.phase_end_at_ms,
            next_after_beep: self.state.next_after_beep,
            at: to_datetime(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh cycle at Work. Restarts from Work even when running.
    pub fn start<A: AlertSink + ?Sized>(&mut self, now_ms: i64, alerts: &mut A) -> Event {
        self.state.running = true;
        info!("timer started");
        self.start_phase(Phase::Work, AfterBeep::Rest, now_ms, alerts)
    }

    /// Halt the cycle and reset to Ready. Calling it again changes nothing.
    pub fn stop<A: AlertSink + ?Sized>(&mut self, now_ms: i64, alerts: &mut A) -> Event {
        if self.state.running {
            info!(phase = %self.state.phase, "timer stopped");
        }
        self.state = TimerState::default();
        alerts.stop();
        Event::TimerStopped {
            at: to_datetime(now_ms),
        }
    }

    /// Enter `phase` with its window starting at `base_ms`.
    ///
    /// Entering Beep sounds the alert; entering anything else silences it.
    pub fn start_phase<A: AlertSink + ?Sized>(
        &mut self,
        phase: Phase,
        next_after_beep: AfterBeep,
        base_ms: i64,
        alerts: &mut A,
    ) -> Event {
        let duration_secs = phase.duration_secs();
        let ends_at_ms = base_ms.saturating_add(phase.duration_ms());

        self.state.phase = phase;
        self.state.phase_end_at_ms = Some(ends_at_ms);
        self.state.seconds_left = duration_secs;
        self.state.next_after_beep = next_after_beep;

        if phase == Phase::Beep {
            alerts.emit(duration_secs);
        } else {
            alerts.stop();
        }

        debug!(%phase, ends_at_ms, "phase started");
        Event::PhaseStarted {
            phase,
            next_after_beep,
            duration_secs,
            ends_at_ms,
            at: to_datetime(base_ms),
        }
    }

    /// Replay every transition whose end time is at or before `now_ms`.
    ///
    /// Each replayed phase starts at the previous phase's end time, so a
    /// suspension of any length resolves to the same state continuous
    /// ticking would have produced. Returns the phases entered, in order.
    pub fn advance<A: AlertSink + ?Sized>(&mut self, now_ms: i64, alerts: &mut A) -> Vec<Event> {
        let mut events = Vec::new();
        while self.state.running {
            let Some(end) = self.state.phase_end_at_ms else {
                break;
            };
            if now_ms < end {
                break;
            }
            let (next, after) = successor(self.state.phase, self.state.next_after_beep);
            events.push(self.start_phase(next, after, end, alerts));
        }

        if events.len() > 1 {
            info!(transitions = events.len(), phase = %self.state.phase, "caught up after missed transitions");
        } else if !events.is_empty() {
            info!(phase = %self.state.phase, "phase transition");
        }

        if self.state.running {
            self.state.seconds_left = self.remaining(now_ms);
        }
        events
    }
}

/// `max(0, ceil(ms / 1000))`.
fn ceil_secs(ms: i64) -> u64 {
    if ms <= 0 {
        0
    } else {
        ((ms - 1) / 1000 + 1) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::RecordingAlerts;

    const T0: i64 = 1_700_000_000_000;

    fn started() -> (PhaseEngine, RecordingAlerts) {
        let mut engine = PhaseEngine::new();
        let mut alerts = RecordingAlerts::default();
        engine.start(T0, &mut alerts);
        (engine, alerts)
    }

    #[test]
    fn new_engine_is_ready() {
        let engine = PhaseEngine::new();
        assert_eq!(engine.phase(), Phase::Ready);
        assert!(!engine.is_running());
        assert_eq!(engine.state().phase_end_at_ms(), None);
        assert_eq!(engine.state().seconds_left(), 1200);
    }

    #[test]
    fn start_enters_work() {
        let (engine, _) = started();
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.state().seconds_left(), 1200);
        assert_eq!(engine.state().phase_end_at_ms(), Some(T0 + 1_200_000));
        assert_eq!(engine.state().next_after_beep(), AfterBeep::Rest);
    }

    #[test]
    fn remaining_rounds_up_at_boundaries() {
        let (mut engine, mut alerts) = started();
        for _ in 0..4 {
            let end = engine.state().phase_end_at_ms().unwrap();
            assert_eq!(engine.remaining(end), 0);
            assert_eq!(engine.remaining(end - 1000), 1);
            assert_eq!(engine.remaining(end - 1001), 2);
            assert_eq!(engine.remaining(end + 5000), 0);
            engine.advance(end, &mut alerts);
        }
    }

    #[test]
    fn work_elapsed_enters_beep() {
        let (mut engine, mut alerts) = started();
        let events = engine.advance(T0 + 1_200_000, &mut alerts);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.phase(), Phase::Beep);
        assert_eq!(engine.state().next_after_beep(), AfterBeep::Rest);
        assert_eq!(engine.state().seconds_left(), 3);
        assert_eq!(alerts.emitted, vec![3]);
    }

    #[test]
    fn beep_elapsed_enters_rest_and_silences() {
        let (mut engine, mut alerts) = started();
        engine.advance(T0 + 1_200_000, &mut alerts);
        let stops_before = alerts.stops;
        engine.advance(T0 + 1_203_000, &mut alerts);
        assert_eq!(engine.phase(), Phase::Rest);
        assert_eq!(engine.state().seconds_left(), 20);
        assert_eq!(alerts.stops, stops_before + 1);
    }

    #[test]
    fn advance_before_end_only_refreshes_seconds() {
        let (mut engine, mut alerts) = started();
        let events = engine.advance(T0 + 10_500, &mut alerts);
        assert!(events.is_empty());
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.state().seconds_left(), 1190);
    }

    #[test]
    fn catches_up_through_missed_transitions() {
        let (mut engine, mut alerts) = started();
        let now = T0 + 1_200_000 + 3_000 + 20_000 + 1_500;
        let events = engine.advance(now, &mut alerts);

        let phases: Vec<Phase> = events
            .iter()
            .map(|e| match e {
                Event::PhaseStarted { phase, .. } => *phase,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(phases, vec![Phase::Beep, Phase::Rest, Phase::Beep]);
        assert_eq!(engine.phase(), Phase::Beep);
        assert_eq!(engine.state().next_after_beep(), AfterBeep::Work);
        assert_eq!(engine.state().seconds_left(), 2);
        assert_eq!(alerts.emitted, vec![3, 3]);
    }

    #[test]
    fn long_suspension_lands_on_schedule() {
        let (mut engine, mut alerts) = started();
        // Ten full cycles plus 100 s into the eleventh Work window.
        let cycle = 1_200_000 + 3_000 + 20_000 + 3_000;
        let events = engine.advance(T0 + 10 * cycle + 100_000, &mut alerts);
        assert_eq!(events.len(), 40);
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.state().seconds_left(), 1100);
    }

    #[test]
    fn stopped_engine_never_transitions() {
        let mut engine = PhaseEngine::new();
        let mut alerts = RecordingAlerts::default();
        assert!(engine.advance(T0 + 99_000_000, &mut alerts).is_empty());
        assert_eq!(engine.phase(), Phase::Ready);
        assert_eq!(engine.remaining(T0), 1200);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut engine, mut alerts) = started();
        engine.advance(T0 + 1_200_500, &mut alerts);
        engine.stop(T0 + 1_201_000, &mut alerts);
        let once = engine.state().clone();
        engine.stop(T0 + 1_202_000, &mut alerts);
        assert_eq!(engine.state(), &once);
        assert_eq!(once, TimerState::default());
        assert_eq!(once.seconds_left(), 1200);
        assert_eq!(once.phase_end_at_ms(), None);
    }

    #[test]
    fn start_always_restarts_at_work() {
        let (mut engine, mut alerts) = started();
        engine.advance(T0 + 1_210_000, &mut alerts);
        assert_eq!(engine.phase(), Phase::Rest);
        engine.start(T0 + 1_210_000, &mut alerts);
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.state().seconds_left(), 1200);
    }

    #[test]
    fn snapshot_reports_fresh_remaining() {
        let (engine, _) = started();
        match engine.snapshot(T0 + 60_000) {
            Event::StateSnapshot {
                phase,
                seconds_left,
                running,
                ..
            } => {
                assert_eq!(phase, Phase::Work);
                assert_eq!(seconds_left, 1140);
                assert!(running);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn ceil_secs_handles_the_full_range() {
        assert_eq!(ceil_secs(i64::MIN), 0);
        assert_eq!(ceil_secs(0), 0);
        assert_eq!(ceil_secs(1), 1);
        assert_eq!(ceil_secs(1_000), 1);
        assert_eq!(ceil_secs(1_001), 2);
        assert_eq!(ceil_secs(i64::MAX), (i64::MAX / 1000 + 1) as u64);
    }

    #[test]
    fn remaining_at_extreme_clocks_does_not_overflow() {
        let (engine, _) = started();
        assert_eq!(engine.remaining(i64::MAX), 0);
        assert!(engine.remaining(i64::MIN) > 1200);
    }
}
