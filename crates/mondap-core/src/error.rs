//! Error types for the mondap client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, API, authentication, and credential storage errors, plus the
//! [`Failure`] classification produced for each dispatched attempt.

use std::fmt;
use thiserror::Error;

/// The unified error type for mondap operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-2xx responses from the API.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Authentication errors (expired or missing session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Credential store errors.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// Input validation errors (invalid base URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Classified outcome of one dispatched attempt.
///
/// Produced by the dispatcher, consumed by the session pipeline; only
/// `AuthExpired` is acted on inside the pipeline, everything else passes
/// through to the caller untouched.
#[derive(Debug, Error)]
pub enum Failure {
    /// The access token was rejected on a first attempt; the call may be
    /// replayed once after a renewal.
    #[error("access credential expired")]
    AuthExpired,
    /// The access token was rejected again on the replayed attempt, or the
    /// session was torn down. Terminal.
    #[error("session expired")]
    SessionExpired,
    /// Any non-auth failure, carrying the original error. Terminal for the
    /// call; never treated as an auth condition.
    #[error("network failure: {0}")]
    Network(NetworkError),
}

/// The non-auth half of the failure taxonomy.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<Failure> for Error {
    fn from(failure: Failure) -> Self {
        match failure {
            // AuthExpired only escapes the pipeline once the single replay
            // is spent, at which point it is terminal.
            Failure::AuthExpired | Failure::SessionExpired => {
                Error::Auth(AuthError::SessionExpired)
            }
            Failure::Network(NetworkError::Transport(e)) => Error::Transport(e),
            Failure::Network(NetworkError::Api(e)) => Error::Api(e),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The session has expired or no credential pair is available.
    #[error("session expired")]
    SessionExpired,
}

/// Errors from a [`crate::CredentialStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O failed: {message}")]
    Io { message: String },

    /// The stored credential data could not be decoded.
    #[error("stored credentials are corrupt: {message}")]
    Corrupt { message: String },
}

/// A non-2xx API response.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code from the server (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this response rejected the presented credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL format.
    #[error("invalid API base URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },
}
