//! Utility modules for common functionality
//!
//! - `logging`: tracing subscriber setup
//! - `progress`: progress bar helpers shared by the batch commands

pub mod logging;
pub mod progress;
