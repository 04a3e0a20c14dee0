//! Shared utilities for logrecycler
//!
//! This crate provides:
//! - Exit classes shared by every error type
//! - The program name used in user-facing messages
//! - Default config path resolution

mod error;
mod paths;

pub use error::*;
pub use paths::*;

/// Name used in usage messages and `--help`
pub const PROGRAM_NAME: &str = "logrecycler";
