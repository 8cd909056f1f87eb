//! Configuration management commands.

pub mod config;
