//! Symbol parsing for trading pairs.

use std::fmt;

/// Maximum length, in bytes, of a base or quote asset token.
pub const MAX_ASSET_LEN: usize = 15;

/// A base/quote trading pair parsed from a venue symbol.
///
/// Accepted separators on parse are `-`, `/` and `_`; the canonical internal
/// form renders with `-`. Both tokens are capped at [`MAX_ASSET_LEN`] bytes;
/// longer tokens are truncated rather than rejected, since a malformed
/// symbol should degrade gracefully rather than abort a market-data feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TradingPair {
    base: String,
    quote: String,
}

impl TradingPair {
    /// Build a pair directly from already-separated tokens, truncating each
    /// to [`MAX_ASSET_LEN`] bytes.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        TradingPair {
            base: truncate_ascii(base.into()),
            quote: truncate_ascii(quote.into()),
        }
    }

    /// Parse a symbol such as `BTC-USDC`, `BTC/USDC` or `BTC_USDC`.
    ///
    /// Returns `None` if no recognized separator is present.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        for sep in ['-', '/', '_'] {
            if let Some((base, quote)) = symbol.split_once(sep) {
                return Some(TradingPair::new(base, quote));
            }
        }
        None
    }

    /// The base asset token.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The quote asset token.
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Render in "hummingbot" form, e.g. `BTC-USDC`.
    pub fn to_hummingbot(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }

    /// Render in "ccxt" form, e.g. `BTC/USDC`.
    pub fn to_ccxt(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hummingbot())
    }
}

fn truncate_ascii(mut s: String) -> String {
    if s.len() > MAX_ASSET_LEN {
        s.truncate(MAX_ASSET_LEN);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_separators() {
        for symbol in ["BTC-USDC", "BTC/USDC", "BTC_USDC"] {
            let pair = TradingPair::from_symbol(symbol).unwrap();
            assert_eq!(pair.base(), "BTC");
            assert_eq!(pair.quote(), "USDC");
        }
    }

    #[test]
    fn unrecognized_symbol_is_none() {
        assert!(TradingPair::from_symbol("BTCUSDC").is_none());
    }

    #[test]
    fn renders_hummingbot_and_ccxt() {
        let pair = TradingPair::new("ETH", "USDT");
        assert_eq!(pair.to_hummingbot(), "ETH-USDT");
        assert_eq!(pair.to_ccxt(), "ETH/USDT");
    }

    #[test]
    fn truncates_overlong_tokens() {
        let pair = TradingPair::new("A".repeat(20), "USDC");
        assert_eq!(pair.base().len(), MAX_ASSET_LEN);
    }
}
