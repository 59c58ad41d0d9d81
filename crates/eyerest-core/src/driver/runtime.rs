//! Real-time scheduler on tokio timers and channels.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use super::{Command, Scheduler, Wake};
use crate::storage::DriverConfig;

/// Out-of-band notifications from the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// The process was resumed / brought back to the foreground.
    FocusRegained,
    Shutdown,
}

enum Fired {
    Command(Option<Command>),
    Signal(Option<HostSignal>),
    Frame,
    Poll,
    KeepAlive,
    Deadline,
    Idle,
}

pub struct TokioScheduler {
    frame: Interval,
    poll: Interval,
    keep_alive: Interval,
    deadline: Option<Instant>,
    armed: bool,
    commands: UnboundedReceiver<Command>,
    commands_open: bool,
    signals: UnboundedReceiver<HostSignal>,
    signals_open: bool,
}

impl TokioScheduler {
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: &DriverConfig,
        commands: UnboundedReceiver<Command>,
        signals: UnboundedReceiver<HostSignal>,
    ) -> Self {
        Self {
            frame: periodic(config.frame_interval_ms),
            poll: periodic(config.poll_interval_ms),
            keep_alive: periodic(config.keep_alive_ms),
            deadline: None,
            armed: false,
            commands,
            commands_open: true,
            signals,
            signals_open: true,
        }
    }
}

fn periodic(period_ms: u64) -> Interval {
    let mut ticker = interval(Duration::from_millis(period_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

impl Scheduler for TokioScheduler {
    async fn next_wake(&mut self) -> Wake {
        loop {
            let deadline_at = self.deadline.unwrap_or_else(Instant::now);
            let fired = tokio::select! {
                cmd = self.commands.recv(), if self.commands_open => Fired::Command(cmd),
                sig = self.signals.recv(), if self.signals_open => Fired::Signal(sig),
                _ = self.frame.tick(), if self.armed => Fired::Frame,
                _ = self.poll.tick(), if self.armed => Fired::Poll,
                _ = self.keep_alive.tick(), if self.armed => Fired::KeepAlive,
                _ = sleep_until(deadline_at), if self.deadline.is_some() => Fired::Deadline,
                else => Fired::Idle,
            };

            match fired {
                Fired::Command(Some(cmd)) => return Wake::Command(cmd),
                Fired::Command(None) => {
                    debug!("command channel closed");
                    self.commands_open = false;
                }
                Fired::Signal(Some(HostSignal::FocusRegained)) => return Wake::FocusRegained,
                Fired::Signal(Some(HostSignal::Shutdown)) => return Wake::Shutdown,
                Fired::Signal(None) => {
                    debug!("signal channel closed");
                    self.signals_open = false;
                }
                Fired::Frame => return Wake::Frame,
                Fired::Poll => return Wake::Poll,
                Fired::KeepAlive => return Wake::KeepAlive,
                Fired::Deadline => {
                    self.deadline = None;
                    return Wake::Deadline;
                }
                Fired::Idle => return Wake::Shutdown,
            }
        }
    }

    fn arm(&mut self) {
        if !self.armed {
            self.frame.reset();
            self.poll.reset();
            self.keep_alive.reset();
            self.armed = true;
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.deadline = None;
    }

    fn arm_deadline(&mut self, after: Duration) {
        self.deadline = Some(Instant::now() + after);
    }
}
