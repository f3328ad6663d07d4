//! Risk validation failures.

use std::fmt;

/// Why `RiskManager::validate` rejected a request.
///
/// Validation is fail-fast: only the first violated rule (in the order
/// `RiskManager::validate` checks them) is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RiskError {
    KillSwitchActive,
    OrderSizeExceeded { quantity: String, max: String },
    PositionLimitExceeded { asset: String, new_position: String, limit: String },
    MaxOpenOrdersReached { symbol: String, max: u32 },
    DailyLossExceeded { loss: String, max: String },
}

impl fmt::Display for RiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskError::KillSwitchActive => write!(f, "kill switch is active"),
            RiskError::OrderSizeExceeded { quantity, max } => {
                write!(f, "order size {quantity} exceeds max {max}")
            }
            RiskError::PositionLimitExceeded { asset, new_position, limit } => write!(
                f,
                "position limit exceeded for {asset}: {new_position} > {limit}"
            ),
            RiskError::MaxOpenOrdersReached { symbol, max } => {
                write!(f, "max open orders ({max}) reached for {symbol}")
            }
            RiskError::DailyLossExceeded { loss, max } => {
                write!(f, "daily loss limit exceeded: {loss} > {max}")
            }
        }
    }
}

impl std::error::Error for RiskError {}
