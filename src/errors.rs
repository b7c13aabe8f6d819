//! Error types for the quicknotes application.
//!
//! This module defines the error kinds that can surface from note storage
//! operations and from the command surfaces built on top of it.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the quicknotes application.
#[derive(Error, Debug)]
pub enum NoteError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Note was not found when performing an operation.
    #[error("Note with ID {id} not found")]
    NoteNotFound { id: u64 },

    /// Title or content is empty after trimming.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// A persisted note parsed as JSON but its contents are unusable.
    #[error("Invalid note format: {message}")]
    InvalidFormat { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// The notes directory cannot be created, read or written.
    #[error("Failed to create or access directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed input to a CLI or console command.
    #[error("{message}")]
    InvalidCommand { message: String },
}

impl NoteError {
    pub fn validation(message: impl Into<String>) -> Self {
        NoteError::ValidationFailed {
            message: message.into(),
        }
    }

    pub fn invalid_command(message: impl Into<String>) -> Self {
        NoteError::InvalidCommand {
            message: message.into(),
        }
    }
}
