//! Child handle and exit outcome

use recycler_util::KILLED_EXIT_CODE;
use std::fmt;

/// Identifiers of a launched child
///
/// The child always leads a brand-new process group, so `pgid == pid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildHandle {
    pub pid: u32,
    pub pgid: u32,
}

impl ChildHandle {
    pub fn new(pid: u32) -> Self {
        Self { pid, pgid: pid }
    }
}

/// Lifecycle of a supervised child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Starting,
    Running,
    Exited(u8),
    Killed(i32),
}

/// Normalized termination result of the wrapped command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The command exited on its own with this code
    Exited(u8),

    /// The command was terminated by a signal
    Killed {
        signal: i32,
        /// Whether this is the signal logrecycler forwarded to the group
        forwarded: bool,
    },
}

impl ExitOutcome {
    /// Build an outcome from a raw exit code, clamping anything outside `0..=255`
    pub fn with_code(code: i32) -> Self {
        Self::Exited(u8::try_from(code).unwrap_or(KILLED_EXIT_CODE))
    }

    pub fn signaled(signal: i32, forwarded: bool) -> Self {
        Self::Killed { signal, forwarded }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Exited(0))
    }

    /// Exit status logrecycler itself should report
    ///
    /// Any signal death reports 255, whether or not the signal was forwarded.
    pub fn exit_code(&self) -> u8 {
        match *self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Killed { .. } => KILLED_EXIT_CODE,
        }
    }

    pub fn state(&self) -> ChildState {
        match *self {
            ExitOutcome::Exited(code) => ChildState::Exited(code),
            ExitOutcome::Killed { signal, .. } => ChildState::Killed(signal),
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exited with code {}", code),
            ExitOutcome::Killed { signal, forwarded } => {
                write!(f, "killed by signal {}", signal)?;
                if *forwarded {
                    write!(f, " (forwarded)")?;
                }
                Ok(())
            }
        }
    }
}
