//! Commands that write labels.

pub mod apply;
pub mod autofill;
