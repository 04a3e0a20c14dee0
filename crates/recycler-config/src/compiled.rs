//! Compiled configuration structures

use crate::schema::{scalar_to_string, RawConfig, RawPattern};
use crate::validation::compile_regex;
use crate::ConfigResult;
use regex::Regex;
use tracing::debug;

/// Compiled configuration ready for use by the line transformer
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Applied to every line before patterns
    pub preprocess: Option<Regex>,

    /// Tried in declared order, first match wins
    pub patterns: Vec<Pattern>,
}

impl Config {
    /// Compile a validated raw config.
    ///
    /// `preprocess` is compiled first, then each pattern in declared order;
    /// the first failure aborts the whole build.
    pub fn from_raw(raw: RawConfig) -> ConfigResult<Self> {
        // An empty preprocess behaves as if it was not configured
        let preprocess = match raw.preprocess.as_deref() {
            None | Some("") => None,
            Some(expr) => Some(compile_regex(expr, "preprocess")?),
        };

        let patterns = raw
            .patterns
            .into_iter()
            .enumerate()
            .map(|(index, p)| Pattern::from_raw(p, index))
            .collect::<ConfigResult<Vec<_>>>()?;

        debug!(
            preprocess = preprocess.is_some(),
            patterns = patterns.len(),
            "Configuration compiled"
        );

        Ok(Self {
            preprocess,
            patterns,
        })
    }

    /// True when lines are emitted as `{"message": line}` unchanged
    pub fn is_passthrough(&self) -> bool {
        self.preprocess.is_none() && self.patterns.is_empty()
    }
}

/// Compiled pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    pub name: Option<String>,
    pub regex: Regex,
    pub add: Vec<(String, String)>,
    pub discard: bool,
    index: usize,
}

impl Pattern {
    fn from_raw(raw: RawPattern, index: usize) -> ConfigResult<Self> {
        let regex = compile_regex(&raw.regex, &format!("patterns[{}].regex", index))?;

        // Keys and values were checked by validate_config
        let add = raw
            .add
            .iter()
            .filter_map(|(k, v)| Some((scalar_to_string(k)?, scalar_to_string(v)?)))
            .collect();

        Ok(Self {
            name: raw.name.filter(|n| !n.is_empty()),
            regex,
            add,
            discard: raw.discard,
            index,
        })
    }

    /// Configured name, or the config location when unnamed
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("patterns[{}]", self.index),
        }
    }

    /// Named capture groups, in the order they appear in the regex
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_preprocess_is_unset() {
        let raw = RawConfig {
            preprocess: Some(String::new()),
            patterns: vec![],
        };
        let config = Config::from_raw(raw).unwrap();
        assert!(config.preprocess.is_none());
        assert!(config.is_passthrough());
    }

    #[test]
    fn preprocess_is_compiled_before_patterns() {
        let raw = RawConfig {
            preprocess: Some("(".into()),
            patterns: vec![RawPattern::new("[")],
        };
        let err = Config::from_raw(raw).unwrap_err();
        assert!(err.to_string().starts_with("regular expression from preprocess: "));
    }

    #[test]
    fn first_bad_pattern_is_reported() {
        let raw = RawConfig {
            preprocess: None,
            patterns: vec![
                RawPattern::new("ok"),
                RawPattern::new("(bad"),
                RawPattern::new("[worse"),
            ],
        };
        let err = Config::from_raw(raw).unwrap_err();
        assert!(err.to_string().starts_with("regular expression from patterns[1].regex: "));
    }

    #[test]
    fn pattern_labels() {
        let mut named = RawPattern::new("hi (?P<who>\\S+)");
        named.name = Some("greeting".into());
        let raw = RawConfig {
            preprocess: None,
            patterns: vec![named, RawPattern::new("bye")],
        };
        let config = Config::from_raw(raw).unwrap();
        assert_eq!(config.patterns[0].label(), "greeting");
        assert_eq!(config.patterns[1].label(), "patterns[1]");
        assert_eq!(config.patterns[0].capture_names().collect::<Vec<_>>(), vec!["who"]);
    }
}
