//! Input selection

use recycler_util::PROGRAM_NAME;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{}: cannot read piped logs and run a command at the same time", PROGRAM_NAME)]
    Conflict,

    #[error("pipe logs to {} or pass a command after --", PROGRAM_NAME)]
    Missing,
}

/// Where lines come from for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Lines piped to our own standard input
    Stdin,
    /// Output of a wrapped command
    Command(Vec<String>),
}

impl InputSource {
    /// Pick exactly one source from the stdin state and the trailing command
    pub fn select(stdin_piped: bool, command: Vec<String>) -> Result<Self, InputError> {
        match (stdin_piped, command.is_empty()) {
            (true, false) => Err(InputError::Conflict),
            (true, true) => Ok(InputSource::Stdin),
            (false, false) => Ok(InputSource::Command(command)),
            (false, true) => Err(InputError::Missing),
        }
    }
}
