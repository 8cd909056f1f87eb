//! Command Line Interface module
//!
//! - `core`: init, list, suggest
//! - `operations`: apply, autofill
//! - `management`: config

pub mod core;
pub mod operations;
pub mod management;

pub use core::*;
pub use operations::*;
pub use management::*;
