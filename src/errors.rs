//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use rusqlite::ErrorCode;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing / validation errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    // ---------------------------
    // Check workflow errors
    // ---------------------------
    #[error("Event not found: {0}")]
    EventNotFound(i64),

    #[error("Event {event_id} has no check #{check_index}")]
    CheckNotFound { event_id: i64, check_index: u32 },

    #[error("Conflict on check #{check_index} of event {event_id}: {reason}")]
    Conflict {
        event_id: i64,
        check_index: u32,
        reason: String,
    },

    #[error("User '{user}' is not an owner of event {event_id} at {at}")]
    Unauthorized {
        user: String,
        event_id: i64,
        at: String,
    },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Import / export errors
    // ---------------------------
    #[error("Import error: {0}")]
    Import(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Errors a polling loop may retry on its next tick.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Io(_) => true,
            AppError::Db(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::CannotOpen
                    | ErrorCode::DiskFull
            ),
            _ => false,
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Export(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn sqlite(code: i32) -> AppError {
        AppError::Db(rusqlite::Error::SqliteFailure(ffi::Error::new(code), None))
    }

    #[test]
    fn only_lock_and_io_failures_are_transient() {
        assert!(sqlite(ffi::SQLITE_BUSY).is_transient());
        assert!(sqlite(ffi::SQLITE_LOCKED).is_transient());
        assert!(sqlite(ffi::SQLITE_IOERR).is_transient());
        assert!(AppError::Io(io::Error::other("disk gone")).is_transient());

        assert!(!sqlite(ffi::SQLITE_CONSTRAINT).is_transient());
        assert!(!AppError::Db(rusqlite::Error::QueryReturnedNoRows).is_transient());
        assert!(!AppError::Db(rusqlite::Error::InvalidColumnType(
            0,
            "start_time".into(),
            rusqlite::types::Type::Integer
        ))
        .is_transient());
        assert!(
            !AppError::Conflict {
                event_id: 1,
                check_index: 1,
                reason: "check was missed".into(),
            }
            .is_transient()
        );
    }
}
