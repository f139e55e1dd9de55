//! Failure policy for polling
//!
//! Polling retries transient failures at the regular poll cadence (no backoff
//! growth) until a fixed number of consecutive failures is reached. Any
//! successful poll resets the count.
//!
//! # Example
//!
//! ```
//! use sight::retry::{ConsecutiveFailures, IsRetryable};
//! use sight::Error;
//!
//! let mut failures = ConsecutiveFailures::new(2);
//! let err = Error::Server { status: 503, body: String::new() };
//! assert!(err.is_retryable());
//! assert!(!failures.record());
//! assert!(failures.record());
//! ```

use crate::error::Error;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network errors, garbled replies, server hiccups) return `true`.
/// Permanent failures (bad credentials, bad input) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the poll should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Network-level failures may clear up on the next poll
            Error::Transport(_) => true,
            // A garbled body is counted like any other failed poll
            Error::Protocol { .. } => true,
            // Non-200 (other than 401) statuses are retried
            Error::Server { .. } => true,
            // A rejected key will not fix itself
            Error::Unauthorized => false,
            // Already the result of retrying
            Error::RetriesExhausted { .. } => false,
            Error::Config { .. }
            | Error::EmptySubmission
            | Error::UnrecognizedFileType { .. }
            | Error::ReadFile { .. }
            | Error::UnsupportedScript(_)
            | Error::Serialization(_)
            | Error::Other(_) => false,
        }
    }
}

/// Counts consecutive failures against a fixed budget
#[derive(Clone, Debug)]
pub struct ConsecutiveFailures {
    count: u32,
    limit: u32,
}

impl ConsecutiveFailures {
    /// Create a counter that is exhausted after `limit` consecutive failures
    pub fn new(limit: u32) -> Self {
        Self { count: 0, limit }
    }

    /// Record a failure; returns true once the budget is exhausted
    pub fn record(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.count >= self.limit
    }

    /// Clear the count after a success
    pub fn reset(&mut self) {
        if self.count > 0 {
            tracing::info!(failures = self.count, "poll succeeded after retry");
        }
        self.count = 0;
    }

    /// Consecutive failures so far
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Failures tolerated before giving up
    pub fn limit(&self) -> u32 {
        self.limit
    }
}
