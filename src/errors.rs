use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub(crate) enum JarError {
    #[error("Jar [{id}] was not found")]
    NotFound { id: Uuid },

    #[error("Invalid jar: {0}")]
    Validation(String),

    #[error("Insufficient funds in '{jar}': requested {requested}, available {available}")]
    InsufficientFunds {
        jar: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Import failed: {0}")]
    ImportFormat(String),
}

impl JarError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn import_format(message: impl Into<String>) -> Self {
        Self::ImportFormat(message.into())
    }
}

impl From<std::io::Error> for JarError {
    fn from(value: std::io::Error) -> Self {
        Self::Persistence(value.to_string())
    }
}

impl From<serde_json::Error> for JarError {
    fn from(value: serde_json::Error) -> Self {
        Self::Persistence(value.to_string())
    }
}

impl From<rusqlite::Error> for JarError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(value.to_string())
    }
}

impl From<tempfile::PersistError> for JarError {
    fn from(value: tempfile::PersistError) -> Self {
        Self::Persistence(value.error.to_string())
    }
}

pub(crate) type Result<T> = std::result::Result<T, JarError>;
