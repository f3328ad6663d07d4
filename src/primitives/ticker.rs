//! Ticker snapshots returned by venue adapters.

use crate::decimal::Decimal;

/// Best-of-book and last-trade snapshot for a symbol on a single venue.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub venue: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub last: Decimal,
    pub timestamp_ms: i64,
}

impl Ticker {
    /// Midpoint of bid and ask.
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::from_i64(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_is_average_of_bid_and_ask() {
        let t = Ticker {
            symbol: "BTC-USDC".into(),
            venue: "lx".into(),
            bid: Decimal::from_i64(100),
            ask: Decimal::from_i64(200),
            last: Decimal::from_i64(150),
            timestamp_ms: 0,
        };
        assert_eq!(t.mid(), Decimal::from_i64(150));
    }
}
