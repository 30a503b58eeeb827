//! Error types for pin reporting.
//!
//! None of these ever escape [`Submitter::submit`](crate::submit::Submitter::submit);
//! they are carried inside [`SubmitEvent`](crate::submit::SubmitEvent)s so that
//! observers can log or assert on them.

use thiserror::Error;

/// Errors that can occur while submitting a pin report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report could not be encoded as JSON.
    #[error("Failed to serialize pin report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The HTTP request could not be constructed (bad URI or header value).
    #[error("Invalid report request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// The request could not be delivered.
    #[error("Transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The response body could not be drained.
    #[error("Failed to drain response body: {0}")]
    Drain(#[from] std::io::Error),
}

/// Errors raised by the trust store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PinError {
    /// A pin set must contain at least one pin.
    #[error("Pin set must not be empty")]
    EmptyPinSet,

    /// None of the observed pins are in the trusted set.
    #[error("No TLS fingerprint match found")]
    Mismatch,
}
