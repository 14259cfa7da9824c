//! Error types for eventpass.
//!
//! This module defines all error types used throughout the eventpass crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for eventpass operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Catalog Errors ===
    /// Failed to read or decode the event catalog.
    #[error("failed to load event catalog from {path}: {message}")]
    CatalogLoad {
        /// Path to the catalog file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// The requested event is not in the catalog.
    #[error("event not found: {name}")]
    EventNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// A catalog color string could not be parsed.
    #[error("invalid color '{value}'")]
    InvalidColor {
        /// The offending value.
        value: String,
    },

    // === Registration Errors ===
    /// User-supplied input was rejected.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// Name of the rejected field.
        field: &'static str,
        /// Why it was rejected.
        message: String,
    },

    // === Identity Errors ===
    /// The identity provider rejected or failed an operation.
    #[error("identity error: {0}")]
    Identity(String),

    // === QR Errors ===
    /// The payload could not be encoded as a QR code.
    #[error("failed to generate QR code: {0}")]
    QrEncode(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for eventpass operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new identity error.
    #[must_use]
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity(message.into())
    }

    /// Create an invalid input error for the named field.
    #[must_use]
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Create a QR encoding error.
    #[must_use]
    pub fn qr_encode(message: impl Into<String>) -> Self {
        Self::QrEncode(message.into())
    }

    /// Check if this error means a catalog lookup came up empty.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EventNotFound { .. })
    }

    /// Check if this error was caused by bad user input.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
