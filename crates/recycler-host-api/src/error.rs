//! Errors from host operations

use recycler_util::ExitClass;
use thiserror::Error;

/// Errors from launching, signaling or draining the wrapped command
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no command given after --")]
    EmptyCommand,

    #[error("exec: \"{program}\": executable file not found in $PATH")]
    ExecutableNotFound { program: String },

    #[error("exec: \"{program}\": {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("signal handler: {0}")]
    SignalSetup(#[source] std::io::Error),

    #[error("signal {signal} to process group {pgid}: {message}")]
    SignalFailed {
        signal: String,
        pgid: u32,
        message: String,
    },

    #[error("child {0} was not captured")]
    StreamUnavailable(&'static str),

    #[error("read {stream}: {source}")]
    Read {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("wait: {0}")]
    Wait(#[source] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HostError {
    /// Launch failures are usage errors; anything after spawn is a runtime failure
    pub fn exit_class(&self) -> ExitClass {
        match self {
            HostError::EmptyCommand
            | HostError::ExecutableNotFound { .. }
            | HostError::SpawnFailed { .. } => ExitClass::Usage,
            _ => ExitClass::Runtime,
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_not_found_message() {
        let err = HostError::ExecutableNotFound {
            program: "wuuut".into(),
        };
        assert_eq!(
            err.to_string(),
            "exec: \"wuuut\": executable file not found in $PATH"
        );
        assert_eq!(err.exit_class(), ExitClass::Usage);
    }

    #[test]
    fn read_failures_are_runtime_errors() {
        let err = HostError::Read {
            stream: "stdout",
            source: std::io::Error::other("boom"),
        };
        assert_eq!(err.to_string(), "read stdout: boom");
        assert_eq!(err.exit_class(), ExitClass::Runtime);
    }
}
