//! Core labelling pipeline
//!
//! - `data`: SQLite content store
//! - `models`: asset and content identifiers, usage filter
//! - `text`: normalization of candidate labels
//! - `usage`: first-usage locator (strategy chain)
//! - `suggest`: per-asset label suggestions
//! - `listing`: assets still missing a label
//! - `batch`: applying operator decisions

pub mod batch;
pub mod data;
pub mod listing;
pub mod models;
pub mod suggest;
pub mod text;
pub mod usage;

pub use data::Database;
