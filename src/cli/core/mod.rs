//! Core CLI commands: preparing the store and reviewing what is missing.

pub mod init;
pub mod list;
pub mod suggest;
