mod config;
pub mod snapshot;

pub use config::{CalendarsConfig, Config};
pub use snapshot::TaskSnapshot;

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/dayslot[-dev]/` based on DAYSLOT_ENV.
///
/// Set DAYSLOT_ENV=dev to use development data directory. DAYSLOT_HOME,
/// when set, replaces the whole path.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("DAYSLOT_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("DAYSLOT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dayslot-dev")
            } else {
                base_dir.join("dayslot")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
