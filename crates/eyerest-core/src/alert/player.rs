//! Audio backend that plays rendered tones through an external player.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tracing::debug;

use super::audio::{AudioBackend, AudioState};
use super::tone::{Tone, SAMPLE_RATE};
use crate::error::AlertError;

/// Players probed on `PATH`, in order.
pub const PLAYER_CANDIDATES: [&str; 3] = ["paplay", "aplay", "afplay"];

#[derive(Debug)]
pub struct PlayerBackend {
    /// Explicit player command; probed candidates are used when `None`.
    command: Option<String>,
    program: Option<PathBuf>,
    cache_dir: PathBuf,
    child: Option<Child>,
}

impl PlayerBackend {
    pub fn new(command: Option<String>) -> Self {
        Self::with_cache_dir(command, std::env::temp_dir())
    }

    pub fn with_cache_dir(command: Option<String>, cache_dir: PathBuf) -> Self {
        Self {
            command,
            program: None,
            cache_dir,
            child: None,
        }
    }

    fn resolve(&self) -> Option<PathBuf> {
        match &self.command {
            Some(cmd) => {
                let path = PathBuf::from(cmd);
                if path.components().count() > 1 {
                    path.is_file().then_some(path)
                } else {
                    find_on_path(cmd)
                }
            }
            None => PLAYER_CANDIDATES.iter().find_map(|name| find_on_path(name)),
        }
    }

    /// Write the tone once per (frequency, duration, volume) and reuse it.
    fn cached_wav(&self, tone: &Tone) -> Result<PathBuf, AlertError> {
        let name = format!(
            "eyerest-{}hz-{}ms-{}.wav",
            tone.frequency_hz.round() as u32,
            tone.duration.as_millis(),
            (tone.volume * 100.0).round() as u32
        );
        let path = self.cache_dir.join(name);
        if !path.is_file() {
            std::fs::write(&path, tone.to_wav(SAMPLE_RATE))?;
        }
        Ok(path)
    }
}

impl AudioBackend for PlayerBackend {
    fn acquire(&mut self) -> Result<AudioState, AlertError> {
        let program = self.resolve().ok_or_else(|| AlertError::Unavailable {
            capability: "audio",
            message: match &self.command {
                Some(cmd) => format!("player '{cmd}' not found"),
                None => format!("none of {PLAYER_CANDIDATES:?} found on PATH"),
            },
        })?;
        debug!(program = %program.display(), "audio player selected");
        self.program = Some(program);
        Ok(AudioState::Active)
    }

    fn resume(&mut self) -> Result<(), AlertError> {
        let still_there = self.program.as_deref().is_some_and(Path::is_file);
        if !still_there {
            self.acquire()?;
        }
        Ok(())
    }

    fn play(&mut self, tone: &Tone) -> Result<(), AlertError> {
        let program = self.program.clone().ok_or(AlertError::Suspended)?;
        let wav = self.cached_wav(tone)?;
        let child = Command::new(&program)
            .arg(&wav)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AlertError::Playback(format!("{}: {e}", program.display())))?;
        self.child = Some(child);
        Ok(())
    }

    fn silence(&mut self) -> Result<(), AlertError> {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                // Already-exited children make kill fail; ignore.
                let _ = child.kill();
            }
            let _ = child.wait();
        }
        Ok(())
    }
}

impl Drop for PlayerBackend {
    fn drop(&mut self) {
        let _ = self.silence();
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
