//! Driver loop.
//!
//! The driver owns the phase engine, the alert sink, the display surface and
//! the clock, and re-evaluates the engine whenever its [`Scheduler`] wakes
//! it: on every refresh frame, on the coarse safety poll, and immediately
//! when the host regains focus. Scheduling is injected, so tests drive the
//! loop with a [`ManualScheduler`] and a manual clock instead of timers.

mod manual;
mod runtime;

pub use manual::ManualScheduler;
pub use runtime::{HostSignal, TokioScheduler};

use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info};

use crate::alert::AlertSink;
use crate::clock::{to_datetime, Clock};
use crate::error::ValidationError;
use crate::events::Event;
use crate::presentation::{Surface, View};
use crate::timer::{Phase, PhaseEngine};

/// Length of the diagnostic alert.
pub const TEST_ALERT_SECS: u64 = 1;

/// User controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    ToggleHaptics,
    TestAlert,
    Quit,
}

impl FromStr for Command {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "start" => Ok(Command::Start),
            "x" | "stop" => Ok(Command::Stop),
            "h" | "haptics" => Ok(Command::ToggleHaptics),
            "t" | "test" => Ok(Command::TestAlert),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(ValidationError::InvalidValue {
                field: "command".into(),
                message: format!("unknown command '{other}' (try s, x, h, t, q)"),
            }),
        }
    }
}

/// Reasons the driver is woken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// High-frequency visual refresh. Only while armed.
    Frame,
    /// One-second safety poll. Only while armed.
    Poll,
    /// Audio resumption attempt. Only while armed.
    KeepAlive,
    /// A one-shot deadline set with [`Scheduler::arm_deadline`] elapsed.
    Deadline,
    /// The host was foregrounded or resumed.
    FocusRegained,
    Command(Command),
    Shutdown,
}

/// Source of wake-ups for the driver.
#[allow(async_fn_in_trait)]
pub trait Scheduler {
    async fn next_wake(&mut self) -> Wake;

    /// Start the periodic frame, poll and keep-alive wake-ups.
    fn arm(&mut self);

    /// Cancel every pending periodic wake-up and deadline.
    fn disarm(&mut self);

    /// Deliver a single [`Wake::Deadline`] after `after`.
    fn arm_deadline(&mut self, after: Duration);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Driver<C, A, S> {
    clock: C,
    engine: PhaseEngine,
    alerts: A,
    surface: S,
    test_alert_until_ms: Option<i64>,
}

impl<C: Clock, A: AlertSink, S: Surface> Driver<C, A, S> {
    pub fn new(clock: C, alerts: A, surface: S) -> Self {
        Self {
            clock,
            engine: PhaseEngine::new(),
            alerts,
            surface,
            test_alert_until_ms: None,
        }
    }

    pub fn engine(&self) -> &PhaseEngine {
        &self.engine
    }

    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn view(&self) -> View {
        View::from_state(self.engine.state(), self.alerts.haptics_enabled())
    }

    pub fn render(&mut self) {
        let view = self.view();
        self.surface.draw(&view);
    }

    /// Catch the engine up to now and redraw.
    pub fn evaluate(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        let events = self.engine.advance(now, &mut self.alerts);
        if !events.is_empty() {
            // Any transition owns the alert output from here on.
            self.test_alert_until_ms = None;
        }
        self.expire_test_alert(now);
        self.alerts.settle();
        debug_assert_eq!(self.engine.state().seconds_left(), self.engine.remaining(now));
        self.render();
        events
    }

    pub fn handle<Sch: Scheduler + ?Sized>(&mut self, wake: Wake, scheduler: &mut Sch) -> Flow {
        match wake {
            Wake::Frame | Wake::Poll | Wake::Deadline => {
                self.evaluate();
            }
            Wake::FocusRegained => {
                let events = self.evaluate();
                debug!(replayed = events.len(), "re-evaluated on focus regain");
            }
            Wake::KeepAlive => {
                if self.engine.is_running() {
                    self.alerts.keep_alive();
                }
            }
            Wake::Command(Command::Start) => {
                let now = self.clock.now_ms();
                self.alerts.unlock();
                self.test_alert_until_ms = None;
                self.engine.start(now, &mut self.alerts);
                self.alerts.settle();
                scheduler.arm();
                self.render();
            }
            Wake::Command(Command::Stop) => {
                self.halt(scheduler);
                self.render();
            }
            Wake::Command(Command::ToggleHaptics) => {
                let enabled = !self.alerts.haptics_enabled();
                self.alerts.set_haptics_enabled(enabled);
                info!(enabled, "haptics toggled");
                self.render();
            }
            Wake::Command(Command::TestAlert) => {
                self.test_alert(scheduler);
                self.render();
            }
            Wake::Command(Command::Quit) | Wake::Shutdown => {
                self.halt(scheduler);
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    /// Fire the diagnostic alert. Timer state is left untouched.
    pub fn test_alert<Sch: Scheduler + ?Sized>(&mut self, scheduler: &mut Sch) -> Event {
        let now = self.clock.now_ms();
        self.alerts.unlock();
        self.alerts.emit(TEST_ALERT_SECS);
        self.alerts.settle();
        self.test_alert_until_ms = Some(now + (TEST_ALERT_SECS * 1000) as i64);
        scheduler.arm_deadline(Duration::from_secs(TEST_ALERT_SECS));
        info!("test alert");
        Event::TestAlert {
            duration_secs: TEST_ALERT_SECS,
            at: to_datetime(now),
        }
    }

    /// Render once, then serve wake-ups until told to exit.
    pub async fn run<Sch: Scheduler>(&mut self, scheduler: &mut Sch) {
        self.render();
        loop {
            let wake = scheduler.next_wake().await;
            if self.handle(wake, scheduler) == Flow::Exit {
                break;
            }
        }
    }

    fn halt<Sch: Scheduler + ?Sized>(&mut self, scheduler: &mut Sch) {
        let now = self.clock.now_ms();
        self.test_alert_until_ms = None;
        scheduler.disarm();
        self.engine.stop(now, &mut self.alerts);
        self.alerts.settle();
    }

    fn expire_test_alert(&mut self, now: i64) {
        let Some(until) = self.test_alert_until_ms else {
            return;
        };
        if now < until {
            return;
        }
        self.test_alert_until_ms = None;
        if self.engine.phase() != Phase::Beep {
            self.alerts.stop();
        }
    }
}
