//! Line transformer

use crate::Record;
use recycler_config::Config;
use regex::{Captures, Regex};
use std::sync::Arc;
use tracing::trace;

/// Applies a compiled config to raw lines
///
/// Cheap to clone; every clone shares the same immutable config.
#[derive(Debug, Clone)]
pub struct LineTransformer {
    config: Arc<Config>,
}

impl LineTransformer {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Transform one line into a record.
    ///
    /// Returns `None` when the first matching pattern discards the line.
    pub fn transform(&self, line: &str) -> Option<Record> {
        let mut record = Record::with_message(line);

        if let Some(preprocess) = &self.config.preprocess
            && let Some(caps) = preprocess.captures(line)
        {
            store_captures(preprocess, &caps, &mut record);
        }

        if self.config.patterns.is_empty() {
            return Some(record);
        }

        // Patterns see the message as rewritten by preprocess
        let subject = record.message().to_owned();
        for pattern in &self.config.patterns {
            let Some(caps) = pattern.regex.captures(&subject) else {
                continue;
            };

            trace!(pattern = %pattern.label(), "Pattern matched");

            if pattern.discard {
                return None;
            }

            store_captures(&pattern.regex, &caps, &mut record);
            for (key, value) in &pattern.add {
                record.set(key.as_str(), value.as_str());
            }
            break;
        }

        Some(record)
    }
}

/// Copy named groups onto the record; groups that did not participate become ""
fn store_captures(regex: &Regex, caps: &Captures<'_>, record: &mut Record) {
    for name in regex.capture_names().flatten() {
        let value = caps.name(name).map_or("", |m| m.as_str());
        record.set(name, value);
    }
}
