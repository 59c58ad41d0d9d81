//! Lazily acquired audio output resource.
//!
//! ```text
//! Unacquired --acquire--> Suspended --resume--> Active
//!      \________acquire__________________________^ |
//!                      Suspended <--playback fails-+
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tone::Tone;
use crate::error::AlertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioState {
    Unacquired,
    Suspended,
    Active,
}

/// A concrete way of producing sound.
pub trait AudioBackend {
    /// Obtain the output resource. It may come back suspended.
    fn acquire(&mut self) -> Result<AudioState, AlertError>;

    /// Bring a suspended resource back.
    fn resume(&mut self) -> Result<(), AlertError>;

    /// Start playing `tone`. Any previous tone has already been silenced.
    fn play(&mut self, tone: &Tone) -> Result<(), AlertError>;

    /// Silence whatever is playing. Must be a no-op when idle.
    fn silence(&mut self) -> Result<(), AlertError>;
}

/// Wraps a backend with explicit lifecycle state.
#[derive(Debug)]
pub struct AudioOutput<B> {
    backend: B,
    state: AudioState,
}

impl<B: AudioBackend> AudioOutput<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: AudioState::Unacquired,
        }
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Acquire and resume as needed. Calling it while active does nothing.
    pub fn ensure_active(&mut self) -> Result<(), AlertError> {
        if self.state == AudioState::Unacquired {
            self.state = self.backend.acquire()?;
            debug!(state = ?self.state, "audio output acquired");
        }
        if self.state == AudioState::Suspended {
            self.backend.resume()?;
            self.state = AudioState::Active;
            debug!("audio output resumed");
        }
        Ok(())
    }

    /// Mark the resource suspended so the next `ensure_active` resumes it.
    pub fn suspend(&mut self) {
        if self.state == AudioState::Active {
            self.state = AudioState::Suspended;
        }
    }

    pub fn play(&mut self, tone: &Tone) -> Result<(), AlertError> {
        self.ensure_active()?;
        self.backend.silence()?;
        self.backend.play(tone).inspect_err(|_| self.suspend())
    }

    pub fn silence(&mut self) -> Result<(), AlertError> {
        if self.state == AudioState::Unacquired {
            return Ok(());
        }
        self.backend.silence()
    }
}
