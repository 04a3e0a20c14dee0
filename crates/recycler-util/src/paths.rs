//! Default paths for logrecycler
//!
//! The config file is looked up relative to the working directory unless
//! `$LOGRECYCLER_CONFIG` points somewhere else.

use std::path::PathBuf;

/// Environment variable for overriding the config path
pub const LOGRECYCLER_CONFIG_ENV: &str = "LOGRECYCLER_CONFIG";

/// Config filename looked up in the working directory
pub const CONFIG_FILENAME: &str = "logrecycler.yaml";

/// Get the default config path.
///
/// Order of precedence:
/// 1. `$LOGRECYCLER_CONFIG` environment variable (if set and non-empty)
/// 2. `logrecycler.yaml` in the working directory
pub fn default_config_path() -> PathBuf {
    match std::env::var(LOGRECYCLER_CONFIG_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => config_path_without_env(),
    }
}

/// Get the config path without checking the LOGRECYCLER_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    PathBuf::from(CONFIG_FILENAME)
}
