//! The abstract surface every venue implementation satisfies.
//!
//! Wire formats (HTTP/WebSocket payloads) for any concrete venue are out of
//! scope here; this module only specifies the contract the trading client
//! and arbitrage engines are written against, plus a [`mock`] adapter used
//! in tests.

mod adapter;
mod capability;
mod error;
pub mod mock;

pub use adapter::{
    LiquidityResult, OrderCallback, OrderbookCallback, PoolInfo, SwapQuote, TickerCallback,
    TradeCallback, VenueAdapter, VenueInfo, VenueType,
};
pub use capability::VenueCapabilities;
pub use error::AdapterError;
