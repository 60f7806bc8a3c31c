use std::fmt;
use thiserror::Error;

use crate::schema::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Save failed, your changes are kept and can be saved again: {0}")]
    PersistAttemptFailed(String),

    #[error("Photo operation failed: {0}")]
    PhotoOpFailed(String),

    #[error("Report {0} has been submitted and can no longer be edited")]
    Submitted(String),

    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid reporting quarter: {0}")]
    QuarterParse(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether retrying the same persist call could succeed without the
    /// user changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::PersistAttemptFailed(_) | Error::Database(_))
    }
}

impl From<ValidationErrors> for Error {
    fn from(e: ValidationErrors) -> Self {
        Error::Validation(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Other(e.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Database(e.to_string())
    }
}

impl From<rusqlite_migration::Error> for Error {
    fn from(e: rusqlite_migration::Error) -> Self {
        Error::Migration(e.to_string())
    }
}

impl<E: fmt::Display> From<tokio_rusqlite::Error<E>> for Error {
    fn from(e: tokio_rusqlite::Error<E>) -> Self {
        match e {
            tokio_rusqlite::Error::ConnectionClosed => {
                Error::Config("report store is not reachable (connection closed)".into())
            }
            other => Error::Database(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(Error::PersistAttemptFailed("timeout".into()).is_retryable());
        assert!(Error::Database("locked".into()).is_retryable());
        assert!(!Error::Submitted("r1".into()).is_retryable());
        assert!(!Error::Validation(ValidationErrors::default()).is_retryable());
    }

    #[test]
    fn test_closed_connection_is_config_error() {
        let err: Error = tokio_rusqlite::Error::<rusqlite::Error>::ConnectionClosed.into();
        assert!(matches!(err, Error::Config(_)));
    }
}
