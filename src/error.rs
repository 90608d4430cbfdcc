//! Error types for the taskmind library.
//!
//! All fallible operations in this crate return [`Result`], with
//! [`TaskmindError`] as the error type. The taxonomy mirrors the failure
//! boundaries of the learning loop: feature extraction before a fit,
//! training on too little data, an unreachable generative provider, and
//! model-state persistence.

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for taskmind operations.
#[derive(Error, Debug)]
pub enum TaskmindError {
    /// A vectorizer or classifier was used before any `fit`.
    #[error("not fitted: {0}")]
    NotFitted(String),

    /// Not enough labeled samples to train. Expected and recoverable:
    /// it signals "not yet", not "broken".
    #[error("insufficient training data: have {actual}, need {needed}")]
    InsufficientData { needed: usize, actual: usize },

    /// The generative suggestion provider failed, timed out, or returned
    /// an unusable response. Always recovered locally with a default
    /// suggestion, never surfaced to callers.
    #[error("generative provider unavailable: {0}")]
    GenerativeUnavailable(String),

    /// Failure to read or write persisted model state.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// I/O errors (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with TaskmindError.
pub type Result<T> = std::result::Result<T, TaskmindError>;

impl TaskmindError {
    /// Create a new not-fitted error.
    pub fn not_fitted<S: Into<String>>(msg: S) -> Self {
        TaskmindError::NotFitted(msg.into())
    }

    /// Create a new insufficient-data error.
    pub fn insufficient_data(needed: usize, actual: usize) -> Self {
        TaskmindError::InsufficientData { needed, actual }
    }

    /// Create a new generative-unavailable error.
    pub fn generative<S: Into<String>>(msg: S) -> Self {
        TaskmindError::GenerativeUnavailable(msg.into())
    }

    /// Create a new persistence error.
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        TaskmindError::Persistence(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TaskmindError::Other(msg.into())
    }
}
