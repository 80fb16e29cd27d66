//! The module contains the errors the engine can throw.
//!
//! Two layers are kept apart:
//!
//! - [`StorageError`] is what a [`Storage`] backend reports. It is typed so the
//!   engine never has to inspect error strings.
//! - [`EngineError`] is what domain operations return. Every variant maps to
//!   exactly one user-facing reply through [`EngineError::user_message`].
//!
//!  [`Storage`]: crate::Storage
use sea_orm::DbErr;
use thiserror::Error;

/// Fixed reply sent for every failure the user cannot act upon.
pub const INTERNAL_ERROR_MESSAGE: &str = "❌ Internal error, please try again later.";

/// Errors reported by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("\"{0}\" not found")]
    NotFound(String),
    /// The named record already exists. Carries the user-supplied name only.
    #[error("\"{0}\" already present")]
    Conflict(String),
    #[error("profile {0} is not registered")]
    ProfileMissing(i64),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        StorageError::Database(err)
    }
}

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed or missing input, detected before storage is reached.
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("operation timed out")]
    Timeout,
}

impl EngineError {
    /// Reply shown to the end user.
    ///
    /// Validation, conflict and not-found errors carry a message written for
    /// the user. Storage failures and timeouts collapse to
    /// [`INTERNAL_ERROR_MESSAGE`] so backend details never leak.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Conflict(msg) | Self::NotFound(msg) => {
                format!("❌ {msg}")
            }
            Self::Storage(_) | Self::Timeout => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Returns `true` for errors caused by the backend rather than the user.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Timeout)
    }
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            StorageError::ProfileMissing(_) => {
                Self::NotFound("You are not registered yet, send /start first".to_string())
            }
            StorageError::Conflict(what) => Self::Conflict(format!("{what} already exists")),
            StorageError::Database(err) => Self::Storage(err.to_string()),
        }
    }
}
