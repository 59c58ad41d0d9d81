//! Tone synthesis.
//!
//! A tone is a sine wave shaped by a linear attack and release ramp so it
//! starts and ends without a click. Tones render to 16-bit mono PCM and can
//! be wrapped in a RIFF/WAVE container for external players.

use std::f32::consts::TAU;
use std::time::Duration;

pub const SAMPLE_RATE: u32 = 44_100;

/// Longest attack/release ramp.
const MAX_RAMP: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    /// Peak gain, 0.0 ..= 1.0.
    pub volume: f32,
}

impl Tone {
    pub fn new(frequency_hz: f32, duration: Duration, volume: f32) -> Self {
        Self {
            frequency_hz: frequency_hz.max(1.0),
            duration,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Attack and release length: a quarter of the tone, at most 50 ms.
    pub fn ramp(&self) -> Duration {
        (self.duration / 4).min(MAX_RAMP)
    }

    /// Envelope gain at `t` seconds into the tone.
    pub fn gain_at(&self, t: f32) -> f32 {
        let total = self.duration.as_secs_f32();
        if t < 0.0 || t > total {
            return 0.0;
        }
        let ramp = self.ramp().as_secs_f32();
        if ramp == 0.0 {
            return self.volume;
        }
        let shape = (t / ramp).min((total - t) / ramp).min(1.0);
        self.volume * shape
    }

    pub fn sample_count(&self, sample_rate: u32) -> usize {
        (self.duration.as_secs_f64() * f64::from(sample_rate)).round() as usize
    }

    /// Render to signed 16-bit mono samples.
    pub fn render(&self, sample_rate: u32) -> Vec<i16> {
        let rate = sample_rate as f32;
        (0..self.sample_count(sample_rate))
            .map(|n| {
                let t = n as f32 / rate;
                let value = (TAU * self.frequency_hz * t).sin() * self.gain_at(t);
                (value * f32::from(i16::MAX)) as i16
            })
            .collect()
    }

    /// Render and wrap in a canonical 44-byte-header WAVE file.
    pub fn to_wav(&self, sample_rate: u32) -> Vec<u8> {
        let samples = self.render(sample_rate);
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::with_capacity(44 + data_len as usize);

        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");

        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());

        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beep() -> Tone {
        Tone::new(880.0, Duration::from_secs(3), 0.5)
    }

    #[test]
    fn envelope_starts_and_ends_silent() {
        let tone = beep();
        assert_eq!(tone.gain_at(0.0), 0.0);
        assert!(tone.gain_at(3.0).abs() < 1e-6);
        assert!((tone.gain_at(1.5) - 0.5).abs() < 1e-6);
        assert!(tone.gain_at(0.025) > 0.0 && tone.gain_at(0.025) < 0.5);
    }

    #[test]
    fn short_tones_use_quarter_ramp() {
        let tone = Tone::new(440.0, Duration::from_millis(100), 1.0);
        assert_eq!(tone.ramp(), Duration::from_millis(25));
        assert_eq!(beep().ramp(), Duration::from_millis(50));
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(Tone::new(440.0, Duration::from_secs(1), 3.0).volume, 1.0);
        assert_eq!(Tone::new(440.0, Duration::from_secs(1), -1.0).volume, 0.0);
    }

    #[test]
    fn render_respects_peak() {
        let samples = Tone::new(440.0, Duration::from_secs(1), 0.25).render(8_000);
        assert_eq!(samples.len(), 8_000);
        let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak <= (i16::MAX as f32 * 0.25) as u16 + 1);
        assert!(peak > 0);
    }

    #[test]
    fn wav_header_is_well_formed() {
        let wav = Tone::new(440.0, Duration::from_millis(500), 0.5).to_wav(8_000);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[36..40], b"data");
        let data_len = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_len, 8_000);
        assert_eq!(wav.len(), 44 + 8_000);
    }
}
