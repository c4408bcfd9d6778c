mod config;
pub mod store;

pub use config::Config;
pub use store::ProgressStore;

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/mindsprout[-dev]/` based on MINDSPROUT_ENV.
///
/// Set MINDSPROUT_ENV=dev to use the development data directory. This is the
/// process-local directory; the writer falls back to it when the shared
/// directory cannot be opened.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MINDSPROUT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mindsprout-dev")
    } else {
        base_dir.join("mindsprout")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the directory both processes use for the shared store and the
/// change signal. Defaults to `<data_dir>/shared`; deployments where the
/// reader runs under a different container override it via
/// `storage.shared_dir` in the config.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn shared_dir() -> Result<PathBuf> {
    let dir = data_dir()?.join("shared");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
