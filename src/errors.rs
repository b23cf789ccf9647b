/*!
 * Error types for the subtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors produced by the timestamp codec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The text does not match the grammar of the declared format
    #[error("Malformed {format} timestamp: '{input}'")]
    MalformedTimestamp {
        /// The offending text
        input: String,
        /// Format whose grammar was expected
        format: String,
    },

    /// The value cannot be represented in the format
    #[error("Timestamp out of range: {value}")]
    TimestampOutOfRange {
        /// The offending value, in milliseconds
        value: i64,
    },
}

/// Errors that can occur during subtitle parsing and serialization
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// A block could not be parsed; `block` is 1-based
    #[error("Parse error in block {block}: {reason}")]
    ParseError {
        /// Position of the first offending block
        block: usize,
        /// What went wrong
        reason: String,
    },

    /// The format is not one of the supported containers
    #[error("Unknown subtitle format: {0}")]
    UnknownFormat(String),

    /// A timestamp could not be formatted
    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    /// An entry violates the entry invariants (e.g. end before start)
    #[error("Invalid entry {index}: {reason}")]
    InvalidEntry {
        /// Index of the entry as supplied
        index: usize,
        /// What went wrong
        reason: String,
    },
}

/// Errors that can occur when working with translation providers
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Generic adapter failure
    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider is not configured (missing API key)
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the job engine
#[derive(Error, Debug)]
pub enum JobError {
    /// No job with this id exists in the store
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The submission violates a precondition and was rejected
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// The operation requires a completed job
    #[error("Job {job_id} is not ready (status: {status})")]
    NotReady {
        /// Job id
        job_id: String,
        /// Current status
        status: String,
    },

    /// Failure reported by the storage layer
    #[error("Storage error at {path}: {message}")]
    StorageIO {
        /// Path being accessed
        path: String,
        /// Underlying error message
        message: String,
    },

    /// Subtitle codec failure
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),
}

impl JobError {
    /// Build a storage error from an I/O error and the path involved
    pub fn storage(path: impl AsRef<std::path::Path>, error: std::io::Error) -> Self {
        Self::StorageIO {
            path: path.as_ref().display().to_string(),
            message: error.to_string(),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from the job engine
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
