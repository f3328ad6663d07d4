//! Fixed capability record advertised by every adapter.

use std::collections::BTreeSet;

/// What an adapter can do, plus batching and pair limits.
///
/// This is a plain record of booleans rather than a bitflags value: venues
/// are created rarely and inspected often, and callers want to name a field
/// (`caps.amm_swap`) rather than a bit. [`VenueCapabilities::clob`] and
/// [`VenueCapabilities::amm`] give the two default shapes named in the
/// venue contract; adapters may start from either and flip individual
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct VenueCapabilities {
    pub limit_orders: bool,
    pub market_orders: bool,
    pub stop_orders: bool,
    pub post_only: bool,
    pub cancel_orders: bool,
    pub batch_orders: bool,
    pub streaming: bool,
    pub orderbook: bool,
    pub trades: bool,
    pub amm_swap: bool,
    pub add_liquidity: bool,
    pub remove_liquidity: bool,
    pub lp_positions: bool,
    pub max_batch_size: u32,
    pub supported_pairs: BTreeSet<String>,
}

impl VenueCapabilities {
    /// Default shape for a central-limit order book venue: full order
    /// lifecycle plus streaming, no AMM operations.
    pub fn clob() -> Self {
        VenueCapabilities {
            limit_orders: true,
            market_orders: true,
            stop_orders: true,
            post_only: true,
            cancel_orders: true,
            batch_orders: true,
            streaming: true,
            orderbook: true,
            trades: true,
            max_batch_size: 10,
            ..Default::default()
        }
    }

    /// Default shape for an automated market maker venue: swap and
    /// liquidity operations, no order-book lifecycle.
    pub fn amm() -> Self {
        VenueCapabilities {
            market_orders: true,
            streaming: true,
            trades: true,
            amm_swap: true,
            add_liquidity: true,
            remove_liquidity: true,
            lp_positions: true,
            max_batch_size: 1,
            ..Default::default()
        }
    }
}
