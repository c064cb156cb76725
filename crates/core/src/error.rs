//! Error types for the poliqa pipeline.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application, including configuration, document extraction,
//! embedding, index lifecycle, and answer generation errors.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the poliqa pipeline.
///
/// All functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// Structural query-time errors (`IndexMissing`, `IndexIncompatible`) are
/// distinct variants so callers can turn them into actionable instructions
/// instead of generic failures.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single document could not be read or parsed. Recovered by the
    /// build step, which skips the document and continues.
    #[error("Failed to extract {file}: {reason}")]
    Extract { file: String, reason: String },

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Query attempted with no persisted index present
    #[error("No document index found at {0:?}. Build the index before querying.")]
    IndexMissing(PathBuf),

    /// Persisted index was built under a different embedding configuration
    /// than the one currently active
    #[error("Index is incompatible with the active embedding provider: {0}. Delete the index and rebuild it.")]
    IndexIncompatible(String),

    /// Index storage errors (reading/writing the persisted artifact)
    #[error("Index error: {0}")]
    Index(String),

    /// Answer generator (LLM) errors
    #[error("Generator error: {0}")]
    Generator(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
