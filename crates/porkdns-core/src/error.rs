//! Error types for porkdns
//!
//! Every failure carries an [`ErrorKind`] so callers can branch on the
//! class of failure (not-found vs. transport vs. remote rejection) without
//! looking at message text.

use thiserror::Error;

/// Result type alias for porkdns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing credentials, bad provider config or failed initial ping.
    /// Fatal to the whole session.
    Setup,
    /// Local input rejected before any remote call
    Validation,
    /// The remote system returned no record for the requested id
    NotFound,
    /// The remote API answered with a non-success status
    Remote,
    /// HTTP status, connection, timeout or response decoding failure
    Transport,
    /// Tracked-state persistence failure
    Storage,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Setup => "setup",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Remote => "remote",
            ErrorKind::Transport => "transport",
            ErrorKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

/// Core error type for porkdns
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing credentials, invalid provider settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session could not be established (credential probe failed)
    #[error("Setup failed: {0}")]
    Setup(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The remote API rejected the request; `message` is passed through verbatim
    #[error("{operation} failed: {message}")]
    Api {
        /// Operation that was rejected (e.g. "create DNS record")
        operation: String,
        /// Message returned by the remote API
        message: String,
    },

    /// HTTP transport errors (non-2xx status, connection failures)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a setup error
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a remote application error
    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a malformed-response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::Setup(_) => ErrorKind::Setup,
            Error::InvalidInput(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Api { .. } => ErrorKind::Remote,
            Error::Http(_) | Error::Timeout(_) | Error::MalformedResponse(_) => {
                ErrorKind::Transport
            }
            Error::StateStore(_) | Error::Io(_) | Error::Json(_) => ErrorKind::Storage,
        }
    }

    /// True when the remote system reported the record as absent
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
