mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, LedgerTotals, Stats};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/dayforge[-dev]/` based on DAYFORGE_ENV.
///
/// Set DAYFORGE_ENV=dev to use development data directory, or
/// DAYFORGE_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DAYFORGE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DAYFORGE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dayforge-dev")
            } else {
                base_dir.join("dayforge")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
