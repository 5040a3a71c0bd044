//! Error types for release-relay operations.
//!
//! This module defines [`RelayError`], the primary error type used throughout
//! the pipeline, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration and catalog errors abort the running stage
//! - Per-package errors are caught at the batch loop and recorded as
//!   [`Outcome::Failed`](crate::pipeline::Outcome::Failed)
//! - Use `anyhow::Error` (via `RelayError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for release-relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required environment variable is not set.
    #[error("{name} missing")]
    MissingEnv { name: String },

    /// Repository identity is not an `owner/name` pair.
    #[error("Invalid repository '{value}': expected owner/name")]
    InvalidRepository { value: String },

    /// Pipeline configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse pipeline configuration.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The release host answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// External command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Build finished but the expected artifact is not on disk.
    #[error("Artifact for '{package}' not found: {path}")]
    ArtifactNotFound { package: String, path: PathBuf },

    /// Handoff manifest exists but cannot be decoded.
    #[error("Failed to read manifest at {path}: {message}")]
    ManifestError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive creation error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for release-relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
