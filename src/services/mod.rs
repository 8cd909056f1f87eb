//! Service layer
//!
//! - `ContentStore`: the store-access interface every component receives
//! - `SimpleServices`: builds the store and pipeline components from `Config`

pub mod database;
pub mod simple_container;

pub use database::ContentStore;
pub use simple_container::SimpleServices;
