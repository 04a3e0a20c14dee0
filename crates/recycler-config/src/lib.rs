//! Configuration parsing and validation for logrecycler
//!
//! Supports YAML configuration with:
//! - An optional `preprocess` regex applied to every line
//! - An ordered list of `patterns` whose named captures become fields
//! - Strict field checking with the offending location in every error

mod compiled;
mod schema;
mod validation;

pub use compiled::*;
pub use schema::*;
pub use validation::*;

use recycler_util::ExitClass;
use serde_yaml::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("open {}: {}", .path.display(), describe_io_error(.source))]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("field {field} not found{}", .location.as_ref().map(|l| format!(" in {}", l)).unwrap_or_default())]
    UnknownField {
        field: String,
        location: Option<String>,
    },

    #[error("{0}")]
    Structure(String),

    #[error("regular expression from {location}: {message}")]
    InvalidRegex { location: String, message: String },
}

impl ConfigError {
    /// Regex compile failures are content errors, everything else is misuse
    pub fn exit_class(&self) -> ExitClass {
        match self {
            ConfigError::InvalidRegex { .. } => ExitClass::Content,
            _ => ExitClass::Usage,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate configuration from a YAML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let value = if content.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(content)?
    };
    Config::from_value(value)
}

impl Config {
    /// Validate an already-parsed document and compile it
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        check_fields(&value)?;

        let raw: RawConfig = match value {
            Value::Null => RawConfig::default(),
            value => serde_yaml::from_value(value)
                .map_err(|e| ConfigError::Structure(e.to_string()))?,
        };

        validate_config(&raw)?;

        Config::from_raw(raw)
    }
}

fn describe_io_error(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "no such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => err.to_string(),
    }
}
