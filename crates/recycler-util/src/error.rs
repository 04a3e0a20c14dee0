//! Exit classes shared by all logrecycler error types

/// Broad category of a fatal failure, deciding the process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    /// Malformed invocation, bad config structure, missing file, exec failure
    Usage,
    /// Config content that cannot be compiled, e.g. an invalid regex
    Content,
    /// I/O failure after the run started, e.g. a closed output pipe
    Runtime,
}

impl ExitClass {
    /// Process exit status for this class
    pub const fn code(self) -> u8 {
        match self {
            ExitClass::Usage => 2,
            ExitClass::Content | ExitClass::Runtime => 1,
        }
    }
}

/// Exit status reported when the wrapped command was killed by a signal
pub const KILLED_EXIT_CODE: u8 = 255;
