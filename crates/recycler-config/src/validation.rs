//! Configuration validation

use crate::schema::{kind_of, scalar_to_string, RawConfig};
use crate::{ConfigError, ConfigResult};
use regex::Regex;
use serde_yaml::Value;

/// Keys accepted at the top level of the config
pub const TOP_LEVEL_FIELDS: &[&str] = &["preprocess", "patterns"];

/// Keys accepted inside each `patterns` entry
pub const PATTERN_FIELDS: &[&str] = &["regex", "name", "add", "discard"];

/// Check the untyped document for unknown keys and misplaced types.
///
/// Runs before the typed decode so every error can name its location.
pub fn check_fields(value: &Value) -> ConfigResult<()> {
    let mapping = match value {
        Value::Null => return Ok(()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(ConfigError::Structure(format!(
                "config must be a mapping, got {}",
                kind_of(other)
            )));
        }
    };

    for key in mapping.keys() {
        let field = key_name(key);
        if !TOP_LEVEL_FIELDS.contains(&field.as_str()) {
            return Err(ConfigError::UnknownField {
                field,
                location: None,
            });
        }
    }

    match mapping.get("preprocess") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(other) => {
            return Err(ConfigError::Structure(format!(
                "preprocess must be a string, got {}",
                kind_of(other)
            )));
        }
    }

    let patterns = match mapping.get("patterns") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Sequence(patterns)) => patterns,
        Some(other) => {
            return Err(ConfigError::Structure(format!(
                "patterns must be a list, got {}",
                kind_of(other)
            )));
        }
    };

    for (index, pattern) in patterns.iter().enumerate() {
        let location = format!("patterns[{}]", index);
        let pattern = match pattern {
            Value::Mapping(pattern) => pattern,
            other => {
                return Err(ConfigError::Structure(format!(
                    "{} must be a mapping, got {}",
                    location,
                    kind_of(other)
                )));
            }
        };

        for key in pattern.keys() {
            let field = key_name(key);
            if !PATTERN_FIELDS.contains(&field.as_str()) {
                return Err(ConfigError::UnknownField {
                    field,
                    location: Some(location),
                });
            }
        }

        match pattern.get("regex") {
            Some(Value::String(_)) => {}
            None | Some(Value::Null) => {
                return Err(ConfigError::Structure(format!(
                    "{}.regex is required",
                    location
                )));
            }
            Some(other) => {
                return Err(ConfigError::Structure(format!(
                    "{}.regex must be a string, got {}",
                    location,
                    kind_of(other)
                )));
            }
        }
    }

    Ok(())
}

/// Validate a decoded configuration before anything is compiled
pub fn validate_config(config: &RawConfig) -> ConfigResult<()> {
    for (index, pattern) in config.patterns.iter().enumerate() {
        for (key, value) in &pattern.add {
            let Some(field) = scalar_to_string(key) else {
                return Err(ConfigError::Structure(format!(
                    "patterns[{}].add keys must be strings, got {}",
                    index,
                    kind_of(key)
                )));
            };
            if field.is_empty() {
                return Err(ConfigError::Structure(format!(
                    "patterns[{}].add keys cannot be empty",
                    index
                )));
            }
            if scalar_to_string(value).is_none() {
                return Err(ConfigError::Structure(format!(
                    "patterns[{}].add.{} must be a scalar, got {}",
                    index,
                    field,
                    kind_of(value)
                )));
            }
        }
    }

    Ok(())
}

/// Compile a regex, naming the config location on failure
pub fn compile_regex(expr: &str, location: &str) -> ConfigResult<Regex> {
    Regex::new(expr).map_err(|e| ConfigError::InvalidRegex {
        location: location.to_string(),
        message: describe_regex_error(expr, &e),
    })
}

/// One-line rendering of a regex engine error
pub fn describe_regex_error(expr: &str, err: &regex::Error) -> String {
    match err {
        regex::Error::Syntax(detail) => {
            // The engine renders a caret diagram; the reason is on the last "error:" line
            let reason = detail
                .lines()
                .rev()
                .find_map(|line| line.trim().strip_prefix("error: "))
                .unwrap_or_else(|| detail.trim());
            format!("error parsing regexp: {}: `{}`", reason, expr)
        }
        regex::Error::CompiledTooBig(limit) => format!(
            "compiled regexp exceeds size limit of {} bytes: `{}`",
            limit, expr
        ),
        other => format!("error parsing regexp: {}: `{}`", other, expr),
    }
}

fn key_name(key: &Value) -> String {
    scalar_to_string(key).unwrap_or_else(|| kind_of(key).to_string())
}
