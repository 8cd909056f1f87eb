//! Data layer: the SQLite implementation of `ContentStore`

pub mod database;

pub use database::{AttributeKeys, Database, NewItem, StoreSummary};
