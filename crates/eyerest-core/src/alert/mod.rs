//! Alert emitter: the audible/haptic/visual pulse marking a transition.
//!
//! The phase engine sees alerts only through [`AlertSink`]. The production
//! sink is [`AlertEmitter`], which composes an [`AudioOutput`], a
//! [`Haptics`] capability and an [`Indicator`]. Every capability failure is
//! logged and swallowed here; nothing propagates to the engine.

mod audio;
mod haptics;
mod indicator;
mod player;
mod tone;

pub use audio::{AudioBackend, AudioOutput, AudioState};
pub use haptics::{Haptics, NoHaptics, HAPTIC_PATTERN_MS};
pub use indicator::{Indicator, NoIndicator};
pub use player::{PlayerBackend, PLAYER_CANDIDATES};
pub use tone::{Tone, SAMPLE_RATE};

use std::time::Duration;

use tracing::{debug, warn};

use crate::storage::AlertsConfig;

/// What the engine and driver may ask of the alert side.
pub trait AlertSink {
    /// Start a pulse lasting `duration_secs`, replacing any in-flight one.
    fn emit(&mut self, duration_secs: u64);

    /// Silence everything. Safe to call at any time, any number of times.
    fn stop(&mut self);

    /// Apply requests held back by a buffering sink. The driver calls this
    /// once per evaluation.
    fn settle(&mut self) {}

    /// Acquire output resources ahead of the first alert.
    fn unlock(&mut self) {}

    /// Periodic attempt to resume a suspended audio resource.
    fn keep_alive(&mut self) {}

    fn set_haptics_enabled(&mut self, _enabled: bool) {}

    fn haptics_enabled(&self) -> bool {
        false
    }
}

/// Defers `emit` and `stop` until [`AlertSink::settle`], keeping only the
/// last request. A catch-up that replays many beeps sounds at most once.
#[derive(Debug, Clone, Default)]
pub struct Coalesced<A> {
    inner: A,
    pending: Option<Pending>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Emit(u64),
    Stop,
}

impl<A> Coalesced<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            pending: None,
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A: AlertSink> AlertSink for Coalesced<A> {
    fn emit(&mut self, duration_secs: u64) {
        self.pending = Some(Pending::Emit(duration_secs));
    }

    fn stop(&mut self) {
        self.pending = Some(Pending::Stop);
    }

    fn settle(&mut self) {
        match self.pending.take() {
            Some(Pending::Emit(duration_secs)) => self.inner.emit(duration_secs),
            Some(Pending::Stop) => self.inner.stop(),
            None => {}
        }
        self.inner.settle();
    }

    fn unlock(&mut self) {
        self.inner.unlock()
    }

    fn keep_alive(&mut self) {
        self.inner.keep_alive()
    }

    fn set_haptics_enabled(&mut self, enabled: bool) {
        self.inner.set_haptics_enabled(enabled)
    }

    fn haptics_enabled(&self) -> bool {
        self.inner.haptics_enabled()
    }
}

pub struct AlertEmitter<B, H = NoHaptics, I = NoIndicator> {
    audio: AudioOutput<B>,
    haptics: H,
    indicator: I,
    settings: AlertsConfig,
    active: bool,
}

impl<B: AudioBackend, H: Haptics, I: Indicator> AlertEmitter<B, H, I> {
    pub fn new(backend: B, haptics: H, indicator: I, settings: AlertsConfig) -> Self {
        Self {
            audio: AudioOutput::new(backend),
            haptics,
            indicator,
            settings,
            active: false,
        }
    }

    pub fn audio(&self) -> &AudioOutput<B> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioOutput<B> {
        &mut self.audio
    }

    pub fn haptics(&self) -> &H {
        &self.haptics
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn settings(&self) -> &AlertsConfig {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn tone(&self, duration_secs: u64) -> Tone {
        Tone::new(
            self.settings.tone_hz as f32,
            Duration::from_secs(duration_secs),
            self.settings.volume.min(100) as f32 / 100.0,
        )
    }
}

impl<B: AudioBackend, H: Haptics, I: Indicator> AlertSink for AlertEmitter<B, H, I> {
    fn emit(&mut self, duration_secs: u64) {
        self.stop();
        debug!(duration_secs, "alert emitted");

        if self.settings.sound_enabled {
            let tone = self.tone(duration_secs);
            if let Err(e) = self.audio.play(&tone) {
                warn!(error = %e, "tone playback failed");
            }
        }
        if self.settings.haptics_enabled {
            if let Err(e) = self.haptics.pulse(&HAPTIC_PATTERN_MS) {
                debug!(error = %e, "haptic pulse failed");
            }
        }
        if self.settings.flash_enabled {
            if let Err(e) = self.indicator.activate() {
                debug!(error = %e, "visual indicator failed");
            }
        }
        self.active = true;
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(e) = self.audio.silence() {
            debug!(error = %e, "silencing tone failed");
        }
        if let Err(e) = self.haptics.cancel() {
            debug!(error = %e, "cancelling haptics failed");
        }
        if let Err(e) = self.indicator.deactivate() {
            debug!(error = %e, "deactivating indicator failed");
        }
    }

    fn unlock(&mut self) {
        if !self.settings.sound_enabled {
            return;
        }
        if let Err(e) = self.audio.ensure_active() {
            warn!(error = %e, "audio output unavailable");
        }
    }

    fn keep_alive(&mut self) {
        if !self.settings.sound_enabled || self.audio.state() == AudioState::Active {
            return;
        }
        if let Err(e) = self.audio.ensure_active() {
            debug!(error = %e, "audio keep-alive could not resume output");
        }
    }

    fn set_haptics_enabled(&mut self, enabled: bool) {
        self.settings.haptics_enabled = enabled;
    }

    fn haptics_enabled(&self) -> bool {
        self.settings.haptics_enabled
    }
}

/// In-memory sink that records what was asked of it. Used by simulations,
/// where no real output is wanted, and by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingAlerts {
    pub emitted: Vec<u64>,
    pub stops: usize,
    pub unlocks: usize,
    pub keep_alives: usize,
    pub haptics: bool,
    pub active: bool,
}

impl AlertSink for RecordingAlerts {
    fn emit(&mut self, duration_secs: u64) {
        self.emitted.push(duration_secs);
        self.active = true;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.active = false;
    }

    fn unlock(&mut self) {
        self.unlocks += 1;
    }

    fn keep_alive(&mut self) {
        self.keep_alives += 1;
    }

    fn set_haptics_enabled(&mut self, enabled: bool) {
        self.haptics = enabled;
    }

    fn haptics_enabled(&self) -> bool {
        self.haptics
    }
}
