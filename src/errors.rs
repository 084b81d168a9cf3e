//! Error types for the clevernote application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur while managing, persisting, and presenting notes.

use std::io;

use thiserror::Error;

/// The main error type for the clevernote application.
#[derive(Error, Debug)]
pub enum CnError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: i64 },

    /// Title was empty after trimming.
    #[error("Note title cannot be empty")]
    InvalidTitle,

    /// Color is not a `#rrggbb` hex string.
    #[error("Invalid color: {value} (expected #rrggbb)")]
    InvalidColor { value: String },

    /// Login input rejected before anything was stored.
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// Storage key contains characters the key-value store does not accept.
    #[error("Invalid storage key: {key:?}")]
    InvalidKey { key: String },

    /// Reading or writing the key-value store failed.
    #[error("Persistence failure: {message}")]
    Persistence { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    #[error("{message}")]
    EditorError { message: String },
}
