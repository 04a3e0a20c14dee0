//! Raw configuration schema (as parsed from YAML)

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Raw configuration as parsed from YAML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Regex applied to every line before patterns; named captures become fields
    #[serde(default)]
    pub preprocess: Option<String>,

    /// Patterns tried in order, first match wins
    #[serde(default)]
    pub patterns: Vec<RawPattern>,
}

/// Raw pattern definition
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawPattern {
    pub regex: String,

    /// Label used in diagnostics
    #[serde(default)]
    pub name: Option<String>,

    /// Static fields added when the pattern matches (in declared order)
    #[serde(default)]
    pub add: Mapping,

    /// Drop matching lines instead of printing them
    #[serde(default)]
    pub discard: bool,
}

impl RawPattern {
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
            name: None,
            add: Mapping::new(),
            discard: false,
        }
    }
}

/// Render a YAML key or scalar the way it was written
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Short description of a YAML node type for error messages
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
