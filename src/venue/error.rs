//! Errors surfaced by venue adapters.

use std::fmt;

/// An error returned by a [`VenueAdapter`](super::VenueAdapter) operation.
///
/// `NotSupported` is the distinguished variant an adapter must return for an
/// operation it does not implement (most commonly an AMM operation invoked
/// on a CLOB adapter or vice versa): callers can match on it rather than
/// string-sniffing an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AdapterError {
    /// The adapter does not implement this operation.
    NotSupported(String),
    /// The adapter is not connected.
    NotConnected,
    /// The underlying transport returned a non-success status or could not
    /// be reached.
    Transport(String),
    /// A response body could not be parsed into the expected shape.
    Parse(String),
    /// The configured `timeout_ms` elapsed before a response arrived.
    Timeout,
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::NotSupported(op) => write!(f, "{op} not supported"),
            AdapterError::NotConnected => write!(f, "adapter is not connected"),
            AdapterError::Transport(msg) => write!(f, "transport error: {msg}"),
            AdapterError::Parse(msg) => write!(f, "parse error: {msg}"),
            AdapterError::Timeout => write!(f, "adapter call timed out"),
        }
    }
}

impl std::error::Error for AdapterError {}
