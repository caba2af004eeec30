//! Errors shared by the Roamwise crates
//!
//! Config loading, geo and date validation, and the trip store all report
//! through [`Error`]; the composer maps it onto HTTP status codes.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Trip or settings table access failed
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or unparseable TOML file, or a bad stored setting
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected coordinates, bounds, dates or request fields
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization failures and corrupt stored documents
    #[error("Internal error: {0}")]
    Internal(String),
}
