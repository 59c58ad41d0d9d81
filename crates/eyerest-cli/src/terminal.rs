//! Terminal renditions of the display surface, haptics and visual flash.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use eyerest_core::alert::{Haptics, Indicator};
use eyerest_core::{
    AlertEmitter, AlertError, AlertsConfig, Coalesced, PlayerBackend, Surface, View,
};

/// Ring the bell. crossterm has no command for it.
const BEL: &[u8] = b"\x07";

pub type TerminalEmitter = AlertEmitter<PlayerBackend, BellHaptics<Stdout>, Flash>;

/// The interactive sink: replayed beeps collapse into the last one.
pub type TerminalAlerts = Coalesced<TerminalEmitter>;

pub fn emitter(config: &AlertsConfig, flash: Flash) -> TerminalEmitter {
    AlertEmitter::new(
        PlayerBackend::new(config.player.clone()),
        BellHaptics::new(io::stdout()),
        flash,
        config.clone(),
    )
}

pub fn alerts(config: &AlertsConfig, flash: Flash) -> TerminalAlerts {
    Coalesced::new(emitter(config, flash))
}

/// Visual flash shared between the alert emitter and the status line. The
/// line is drawn in reverse video while it is on.
#[derive(Debug, Clone, Default)]
pub struct Flash {
    on: Arc<AtomicBool>,
}

impl Flash {
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Relaxed)
    }
}

impl Indicator for Flash {
    fn activate(&mut self) -> Result<(), AlertError> {
        self.on.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), AlertError> {
        self.on.store(false, Ordering::Relaxed);
        Ok(())
    }
}

/// Single status line, rewritten in place.
pub struct StatusLine<W> {
    out: W,
    flash: Flash,
    last: Option<(String, bool)>,
}

impl<W: Write> StatusLine<W> {
    pub fn new(out: W, flash: Flash) -> Self {
        Self {
            out,
            flash,
            last: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, text: &str, reversed: bool) -> io::Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        if reversed {
            queue!(
                self.out,
                SetAttribute(Attribute::Reverse),
                Print(text),
                SetAttribute(Attribute::NoReverse)
            )?;
        } else {
            queue!(self.out, Print(text))?;
        }
        self.out.flush()
    }
}

pub fn status_text(view: &View) -> String {
    let control = if view.start_enabled { "[s]tart" } else { "[x]stop" };
    let haptics = if view.haptics_enabled { "on" } else { "off" };
    format!(
        "{:<5} {}  {}  {control} [h]aptics:{haptics} [t]est [q]uit",
        view.label, view.clock, view.hint
    )
}

impl<W: Write> Surface for StatusLine<W> {
    fn draw(&mut self, view: &View) {
        let text = status_text(view);
        let reversed = self.flash.is_on();
        if let Some((last, was_reversed)) = &self.last {
            if *last == text && *was_reversed == reversed {
                return;
            }
        }
        // A closed stdout leaves nothing to draw on.
        let _ = self.write_line(&text, reversed);
        self.last = Some((text, reversed));
    }
}

/// One bell per "on" segment of the pattern.
pub struct BellHaptics<W> {
    out: W,
}

impl<W: Write> BellHaptics<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Haptics for BellHaptics<W> {
    fn pulse(&mut self, pattern_ms: &[u64]) -> Result<(), AlertError> {
        for _ in pattern_ms.iter().step_by(2) {
            self.out.write_all(BEL)?;
        }
        self.out.flush()?;
        Ok(())
    }
}
