//! Error types for fieldprobe operations.
//!
//! This module defines the main error type [`FieldprobeError`]. Finding no
//! matching label/value pair is not an error: extraction returns an empty list
//! in that case.
//!
//! # Example
//!
//! ```rust
//! use fieldprobe_core::{FieldprobeError, SearchMode};
//!
//! let mode: Result<SearchMode, FieldprobeError> = "fuzzy".parse();
//! assert!(matches!(mode, Err(FieldprobeError::InvalidArgument(_))));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fragment extraction and markup acquisition.
#[derive(Error, Debug)]
pub enum FieldprobeError {
    /// A caller-supplied argument was rejected.
    ///
    /// Raised for unknown search modes and invalid CSS selectors, before any
    /// matching work starts.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A collaborator required by the chosen acquisition mode is missing.
    ///
    /// Returned when rendered-session acquisition is requested and the session
    /// handle is not live. The core never creates sessions itself.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),

    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP {status} returned for {url}")]
    HttpStatus { status: u16, url: String },

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File or stdin I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The parsed tree broke a structural invariant.
    ///
    /// For example a text node that has no parent. These indicate a bug
    /// rather than bad input, and are never silently skipped.
    #[error("Tree invariant violated: {0}")]
    Invariant(String),
}

impl From<serde_json::Error> for FieldprobeError {
    fn from(err: serde_json::Error) -> Self {
        FieldprobeError::Serialization(err.to_string())
    }
}

/// Result type alias for FieldprobeError.
pub type Result<T> = std::result::Result<T, FieldprobeError>;
