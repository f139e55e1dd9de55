//! Error types for sight
//!
//! This module provides the error taxonomy for the client:
//! - Input errors (bad file paths, unrecognized file types, unreadable files)
//! - Authorization failures (401 from the service)
//! - Transport failures (the HTTP exchange itself failed)
//! - Protocol errors (the service replied with a body we could not decode)
//! - Server errors (any other non-200 status)
//!
//! Errors up to and including the initial exchange are returned directly from
//! [`SightClient::recognize_with`](crate::SightClient::recognize_with). Failures
//! during polling end the page stream and are reported through
//! [`PollOutcome`](crate::PollOutcome).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for sight operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sight
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "channel_capacity")
        key: Option<String>,
    },

    /// No files were given to recognize
    #[error("no files to recognize")]
    EmptySubmission,

    /// A MIME type could not be inferred from the file name
    #[error("failed to infer MIME type from file path: {}", path.display())]
    UnrecognizedFileType {
        /// The offending path
        path: PathBuf,
    },

    /// A file could not be read
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        /// The file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A script hint is not a well-formed script code
    #[error("{0:?} is not a valid script code")]
    UnsupportedScript(String),

    /// The service rejected the API key (HTTP 401)
    #[error("invalid API key: received 401 Unauthorized from the Sight API")]
    Unauthorized,

    /// The service answered with a status other than 200 or 401
    #[error("unexpected HTTP status {status} from the Sight API: {body}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body, lossily decoded
        body: String,
    },

    /// The HTTP exchange failed before a status was received
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body did not match the expected shape
    #[error("malformed {context} response: {message}")]
    Protocol {
        /// Which response was being decoded ("initial" or "poll")
        context: &'static str,
        /// Decoder message
        message: String,
    },

    /// The request body could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Polling gave up after too many consecutive failures
    #[error("polling gave up after {attempts} consecutive failures; last error: {last}")]
    RetriesExhausted {
        /// Number of consecutive failed polls
        attempts: u32,
        /// The failure that exhausted the budget
        last: Box<Error>,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failure of a single HTTP exchange
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client reported an error
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The exchange did not finish in time
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection could not be established or was dropped
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Coarse error category
///
/// Mirrors how callers are expected to react: input and config problems are
/// fixed locally, auth problems need a new key, and the remaining kinds come
/// from the network or the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad configuration value
    Config,
    /// Bad file path, file type, script hint or unreadable file
    Input,
    /// Rejected credentials
    Auth,
    /// Network-level failure
    Transport,
    /// Malformed response body
    Protocol,
    /// Unexpected HTTP status
    Server,
    /// Anything else
    Other,
}

impl Error {
    /// Returns the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } => ErrorKind::Config,
            Error::EmptySubmission
            | Error::UnrecognizedFileType { .. }
            | Error::ReadFile { .. }
            | Error::UnsupportedScript(_) => ErrorKind::Input,
            Error::Unauthorized => ErrorKind::Auth,
            Error::Server { .. } => ErrorKind::Server,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Protocol { .. } => ErrorKind::Protocol,
            Error::RetriesExhausted { last, .. } => last.kind(),
            Error::Serialization(_) | Error::Other(_) => ErrorKind::Other,
        }
    }

    pub(crate) fn protocol(context: &'static str, message: impl ToString) -> Self {
        Error::Protocol {
            context,
            message: message.to_string(),
        }
    }

    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}
