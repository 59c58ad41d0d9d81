use crate::error::AlertError;

/// Full-surface visual flash shown while an alert sounds.
pub trait Indicator {
    fn activate(&mut self) -> Result<(), AlertError>;
    fn deactivate(&mut self) -> Result<(), AlertError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn activate(&mut self) -> Result<(), AlertError> {
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), AlertError> {
        Ok(())
    }
}
