//! Linux host for logrecycler
//!
//! Provides:
//! - Process spawning in a new process group (session leader)
//! - Forwarding of termination signals to the whole group
//! - Exit observation and teardown of leftover descendants
//! - Concurrent stdout/stderr draining into tagged line events
//! - Standard input as a line source

mod process;
mod signals;
mod stdin;
mod streams;

pub use process::*;
pub use signals::*;
pub use stdin::*;
pub use streams::*;
