//! Errors surfaced by the trading client façade.

use std::fmt;

use crate::risk::RiskError;
use crate::venue::AdapterError;

/// An error from placing an order, querying market data, or routing through
/// the client's adapters.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ClientError {
    /// No adapter is registered under this name.
    UnknownVenue(String),
    /// No venue is connected and none was given explicitly.
    NoDefaultVenue,
    /// Rejected by the risk manager before reaching any adapter.
    Risk(RiskError),
    /// The adapter itself failed.
    Adapter(AdapterError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::UnknownVenue(name) => write!(f, "unknown venue {name}"),
            ClientError::NoDefaultVenue => write!(f, "no default venue available"),
            ClientError::Risk(e) => write!(f, "{e}"),
            ClientError::Adapter(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<RiskError> for ClientError {
    fn from(e: RiskError) -> Self {
        ClientError::Risk(e)
    }
}

impl From<AdapterError> for ClientError {
    fn from(e: AdapterError) -> Self {
        ClientError::Adapter(e)
    }
}
