use crate::error::AlertError;

/// On/off pattern in milliseconds, starting with "on".
pub const HAPTIC_PATTERN_MS: [u64; 3] = [200, 100, 200];

/// A vibration-like pulse. Implementations may be entirely absent.
pub trait Haptics {
    fn pulse(&mut self, pattern_ms: &[u64]) -> Result<(), AlertError>;

    fn cancel(&mut self) -> Result<(), AlertError> {
        Ok(())
    }
}

/// The environment has no haptic output. Pulsing it is not an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&mut self, _pattern_ms: &[u64]) -> Result<(), AlertError> {
        Ok(())
    }
}
