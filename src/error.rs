//! Error handling for the altfill-cli application
//!
//! Errors are grouped by the layer that produces them. Store failures are
//! never retried here; they bubble up to the command that issued the query
//! and are reported to the operator from there.

use std::path::PathBuf;
use thiserror::Error;

use rusqlite::ffi;

#[derive(Error, Debug)]
pub enum AltFillError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("File system error: {0}")]
    FileSystem(#[from] FileSystemError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(#[source] rusqlite::Error),

    #[error("Query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Store connection lock poisoned")]
    LockPoisoned,

    #[error("Database corruption detected")]
    Corruption,
}

#[derive(Error, Debug)]
pub enum FileSystemError {
    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Failed to determine project directories")]
    NoProjectDirs,
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Unsupported batch file format: {path}. Use .json, .toml, or .csv")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse JSON batch: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML batch: {0}")]
    Toml(#[source] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AltFillError>;

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ffi::Error { code: ffi::ErrorCode::DatabaseCorrupt, .. }, _) => {
                DatabaseError::Corruption
            }
            _ => DatabaseError::Query(err),
        }
    }
}

impl From<rusqlite::Error> for AltFillError {
    fn from(err: rusqlite::Error) -> Self {
        AltFillError::Database(err.into())
    }
}

impl From<std::io::Error> for FileSystemError {
    fn from(err: std::io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl From<std::io::Error> for AltFillError {
    fn from(err: std::io::Error) -> Self {
        AltFillError::FileSystem(FileSystemError::Io(err))
    }
}

impl From<serde_json::Error> for AltFillError {
    fn from(err: serde_json::Error) -> Self {
        AltFillError::Batch(BatchError::Json(err))
    }
}

impl From<toml::de::Error> for AltFillError {
    fn from(err: toml::de::Error) -> Self {
        AltFillError::Config(ConfigError::InvalidFormat(err))
    }
}

impl From<toml::ser::Error> for AltFillError {
    fn from(err: toml::ser::Error) -> Self {
        AltFillError::Config(ConfigError::Serialize(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_database_maps_to_corruption() {
        let err = rusqlite::Error::SqliteFailure(
            ffi::Error { code: ffi::ErrorCode::DatabaseCorrupt, extended_code: 11 },
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Corruption));
    }

    #[test]
    fn test_other_sqlite_errors_map_to_query() {
        let err = rusqlite::Error::QueryReturnedNoRows;
        assert!(matches!(DatabaseError::from(err), DatabaseError::Query(_)));
    }
}
