//! Model cache discovery
//!
//! Decides where the neural encoder keeps its downloaded weights.

use crate::error::{Result, SolutionError};
use std::path::PathBuf;

/// Environment variable overriding the model cache directory
pub const MODELS_PATH_ENV: &str = "PAINPOINT_MODELS_PATH";

/// Find the model cache directory with priority:
/// 1. explicit path from the caller
/// 2. PAINPOINT_MODELS_PATH environment variable
/// 3. User home directory (~/.painpoint/models)
pub fn find_model_cache_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        log::info!("Using model cache dir: {}", path.display());
        return Ok(path);
    }

    if let Ok(models_path) = std::env::var(MODELS_PATH_ENV) {
        if !models_path.trim().is_empty() {
            let path = PathBuf::from(&models_path);
            log::info!("Using {}: {}", MODELS_PATH_ENV, path.display());
            return Ok(path);
        }
        log::warn!("{} is set but empty, ignoring", MODELS_PATH_ENV);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        let user_path = PathBuf::from(home).join(".painpoint").join("models");
        log::info!("Using user model cache: {}", user_path.display());
        return Ok(user_path);
    }

    Err(SolutionError::invalid_path(format!(
        "Cannot determine model cache directory. Set {MODELS_PATH_ENV} or HOME."
    )))
}
