// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the seepia session runtime
//!
//! Every failure is returned as a value on the operation that caused it.
//! Request failures additionally carry the best-effort [`Response`] through
//! [`ExecuteError`].

use thiserror::Error;

use crate::http::Response;

/// Result type alias for seepia operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the session runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid combination of session options
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dialer or round-tripper construction failed
    #[error("Transport build failed: {0}")]
    TransportBuild(String),

    /// A proxy change failed and restoring the previous proxy failed too.
    ///
    /// `original` is the error of the requested change; the session's
    /// transport state must be treated as unknown.
    #[error("Proxy change to '{requested}' failed ({original}); rollback to '{previous}' failed: {rollback}")]
    ProxyRollback {
        requested: String,
        previous: String,
        original: Box<Error>,
        rollback: Box<Error>,
    },

    /// HTTP request failed inside the reqwest transport
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Network-level failure during request execution
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// Response headers were received but draining the body failed
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a transport build error
    pub fn transport_build<S: Into<String>>(msg: S) -> Self {
        Error::TransportBuild(msg.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a body read error
    pub fn body_read<S: Into<String>>(msg: S) -> Self {
        Error::BodyRead(msg.into())
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if the request failed before a response head arrived
    pub fn is_request_execution(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Network(_) | Error::Timeout { .. }
        )
    }

    /// Check if this error left the session transport in an unknown state
    pub fn transport_state_unknown(&self) -> bool {
        matches!(self, Error::ProxyRollback { .. })
    }

    /// Check if this is recoverable (can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Network(_) | Error::Http(_) | Error::BodyRead(_)
        )
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url: Some(u), .. } => Some(u),
            Error::Http(e) => e.url().map(|u| u.as_str()),
            _ => None,
        }
    }

    /// The error of the requested proxy change, unwrapping a failed rollback
    pub fn original(&self) -> &Error {
        match self {
            Error::ProxyRollback { original, .. } => original,
            other => other,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Failure of [`Session::execute`](crate::Session::execute).
///
/// Always carries a response: the `-1` sentinel when no response head
/// arrived, or the partial snapshot when the body could not be drained.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ExecuteError {
    /// Best-effort response
    pub response: Box<Response>,
    /// What went wrong
    #[source]
    pub error: Error,
}

impl ExecuteError {
    pub(crate) fn new(response: Response, error: Error) -> Self {
        Self {
            response: Box::new(response),
            error,
        }
    }

    /// Split into the response and the error
    pub fn into_parts(self) -> (Response, Error) {
        (*self.response, self.error)
    }
}
