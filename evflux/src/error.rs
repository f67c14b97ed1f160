//! Error types for the evflux event handler.

use thiserror::Error;

/// The main error type for all evflux operations.
///
/// Every variant aborts the current invocation. Nothing inside the crate
/// retries or partially recovers; a caller that wants another attempt re-runs
/// the whole handler.
#[derive(Error, Debug)]
pub enum EvfluxError {
    /// The input event could not be decoded or failed validation.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A record could not be represented in line protocol.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Forwarding the payload to the backend failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors that can occur while reading an event from its JSON form.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The input could not be read.
    #[error("failed to read event: {0}")]
    Read(#[from] std::io::Error),

    /// The input is not a valid event document.
    #[error("failed to parse event JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The event carries neither a check nor metrics.
    #[error("event must contain a check or metrics")]
    Empty,

    /// A metric point has an empty name.
    #[error("metric point {index} has an empty name")]
    EmptyPointName {
        /// Position of the offending point in the event's metrics.
        index: usize,
    },
}

/// Errors that can occur while encoding a record as line protocol.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// A record has no fields; line protocol requires at least one.
    #[error("record '{measurement}' has no fields")]
    NoFields {
        /// The measurement name of the offending record.
        measurement: String,
    },

    /// A tag with a value has an empty key.
    #[error("record '{measurement}' has a tag with an empty key")]
    EmptyTagKey {
        /// The measurement name of the offending record.
        measurement: String,
    },

    /// A field has an empty key.
    #[error("record '{measurement}' has a field with an empty key")]
    EmptyFieldKey {
        /// The measurement name of the offending record.
        measurement: String,
    },

    /// A measurement, key or tag value ends in a backslash, which would
    /// escape the delimiter written after it.
    #[error("record '{measurement}': '{text}' ends in a backslash")]
    TrailingBackslash {
        /// The measurement name of the offending record.
        measurement: String,
        /// The rejected text.
        text: String,
    },

    /// A float field holds NaN or an infinity, which line protocol cannot carry.
    #[error("field '{field}' of record '{measurement}' is not finite: {value}")]
    NonFiniteFloat {
        /// The measurement name of the offending record.
        measurement: String,
        /// The field key.
        field: String,
        /// The rejected value.
        value: f64,
    },
}

/// Errors that can occur while sending the payload to the backend.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The configured backend address is not a usable URL.
    #[error("invalid backend address '{addr}': {reason}")]
    InvalidAddr {
        /// The rejected address.
        addr: String,
        /// Why the address was rejected.
        reason: String,
    },

    /// Failed to create HTTP client.
    #[error("failed to create HTTP client: {source}")]
    ClientCreate {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {source}")]
    RequestFailed {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Server returned a non-2xx status.
    #[error("server returned status {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// The response body text.
        body: String,
    },
}

/// Type alias for `Result<T, EvfluxError>`.
pub type Result<T> = std::result::Result<T, EvfluxError>;
