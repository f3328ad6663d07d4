//! Re-exports the types most call sites need, so that
//!
//! ```rust
//! use lx_trading::prelude::*;
//! ```
//!
//! is usually enough to place orders, read books, and wire up risk and
//! arbitrage without reaching into each submodule individually.

pub use crate::decimal::Decimal;

pub use crate::primitives::{
    AggregatedBalance, Balance, FeeEntry, MarketInfo, Order, OrderRequest, OrderStatus, OrderType, Side, Ticker,
    TimeInForce, Trade, TradingPair,
};

pub use crate::orderbook::{AggregatedLevel, AggregatedOrderbook, Level, OrderBook};

pub use crate::venue::{VenueAdapter, VenueCapabilities, VenueInfo, VenueType};

pub use crate::risk::{RiskConfig, RiskError, RiskManager, ScopedOrderTracker};

pub use crate::client::{ClientConfig, ClientError, TradingClient};

pub use crate::arbitrage::{
    CrossChainRouter, LxFirstArbitrage, LxFirstOpportunity, LxPrice, UnifiedArbitrage, UnifiedOpportunity, VenuePrice,
};

pub use crate::config::Config;
