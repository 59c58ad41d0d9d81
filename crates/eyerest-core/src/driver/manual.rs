use std::collections::VecDeque;
use std::time::Duration;

use super::{Scheduler, Wake};
use crate::clock::ManualClock;

/// Scripted scheduler for simulations and tests.
///
/// Each scripted wake carries a delay that is applied to the shared
/// [`ManualClock`] before the wake is delivered. Periodic wakes are dropped
/// while disarmed and deadline wakes while none is pending, mirroring the
/// cancelled timers of a real scheduler. An exhausted script yields
/// [`Wake::Shutdown`].
#[derive(Debug)]
pub struct ManualScheduler {
    clock: ManualClock,
    script: VecDeque<(i64, Wake)>,
    armed: bool,
    deadline_pending: bool,
    deadlines: Vec<Duration>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            script: VecDeque::new(),
            armed: false,
            deadline_pending: false,
            deadlines: Vec::new(),
        }
    }

    /// Queue `wake` to fire `delay_ms` after the previous one.
    pub fn after(mut self, delay_ms: i64, wake: Wake) -> Self {
        self.push(delay_ms, wake);
        self
    }

    pub fn push(&mut self, delay_ms: i64, wake: Wake) {
        self.script.push_back((delay_ms, wake));
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Every deadline requested so far.
    pub fn deadlines(&self) -> &[Duration] {
        &self.deadlines
    }
}

impl Scheduler for ManualScheduler {
    async fn next_wake(&mut self) -> Wake {
        while let Some((delay_ms, wake)) = self.script.pop_front() {
            self.clock.advance(delay_ms);
            match wake {
                Wake::Frame | Wake::Poll | Wake::KeepAlive if !self.armed => continue,
                Wake::Deadline if !self.deadline_pending => continue,
                Wake::Deadline => {
                    self.deadline_pending = false;
                    return wake;
                }
                other => return other,
            }
        }
        Wake::Shutdown
    }

    fn arm(&mut self) {
        self.armed = true;
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.deadline_pending = false;
    }

    fn arm_deadline(&mut self, after: Duration) {
        self.deadline_pending = true;
        self.deadlines.push(after);
    }
}
