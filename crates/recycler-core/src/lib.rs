//! Line transformation pipeline for logrecycler
//!
//! This crate turns raw log lines into structured records:
//! - Preprocess rewrite through named captures
//! - First-match-wins pattern evaluation
//! - Fallback `{"message": line}` records
//! - Compact, order-preserving JSON serialization

mod record;
mod transform;

pub use record::*;
pub use transform::*;
