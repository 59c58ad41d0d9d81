mod config;

pub use config::{AlertsConfig, Config, DriverConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the configuration directory, creating it if needed.
///
/// `EYEREST_HOME` names the directory outright. Otherwise it is
/// `~/.config/eyerest[-dev]/`, with the `-dev` suffix when `EYEREST_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("EYEREST_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("EYEREST_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("eyerest-dev")
            } else {
                base_dir.join("eyerest")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DirUnavailable {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
