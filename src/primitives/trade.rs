//! Trade prints and listed-market records.

use crate::decimal::Decimal;
use crate::primitives::Side;

/// A single executed trade reported by a venue.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub side: Side,
    pub timestamp_ms: i64,
    pub trade_id: String,
}

/// A market a venue lists for trading.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarketInfo {
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub active: bool,
}
