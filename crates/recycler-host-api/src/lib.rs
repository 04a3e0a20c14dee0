//! Host interface types for logrecycler
//!
//! This crate defines the vocabulary shared between the platform-specific
//! supervisor and the rest of the program. It contains no platform code itself.

mod error;
mod handle;
mod lines;

pub use error::*;
pub use handle::*;
pub use lines::*;
