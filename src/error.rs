//! Error types for the bchtip rate core.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use thiserror::Error;

/// Errors that can occur while fetching a rate from an external provider.
///
/// These are always recovered inside the provider itself (logged and turned
/// into an absent rate); they never reach the resolver's callers.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// Provider returned an error status code
    #[error("Provider error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response body is missing the expected field or its value is unusable
    #[error("Missing or malformed field: {0}")]
    Field(&'static str),
}

/// Errors from upstream capabilities that are NOT recovered at this layer.
///
/// The fee estimator surfaces these to its caller; callers that need
/// resilience choose whether to swallow or propagate.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The upstream node or service could not be reached
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// The upstream answered but the response was unusable
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Other(String),
}

/// Convenience type alias for Results with FetchError
pub type FetchResult<T> = Result<T, FetchError>;

/// Convenience type alias for Results with UpstreamError
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
