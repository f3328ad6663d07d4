//! The `VenueAdapter` trait: the contract every venue implementation satisfies.

use crate::decimal::Decimal;
use crate::orderbook::OrderBook;
use crate::primitives::{Balance, MarketInfo, Order, OrderRequest, Ticker, Trade};

use super::capability::VenueCapabilities;
use super::error::AdapterError;

/// The kind of venue an adapter speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VenueType {
    Native,
    Ccxt,
    Hummingbot,
}

/// A point-in-time summary of an adapter, derived from its other methods.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VenueInfo {
    pub name: String,
    pub venue_type: VenueType,
    pub connected: bool,
    pub latency_ms: Option<i64>,
    pub supported_pairs: Vec<String>,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

/// A quote for an AMM swap.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SwapQuote {
    pub base_token: String,
    pub quote_token: String,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
    pub price_impact_bps: Decimal,
}

/// A snapshot of an AMM pool's reserves.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoolInfo {
    pub base_token: String,
    pub quote_token: String,
    pub base_reserve: Decimal,
    pub quote_reserve: Decimal,
}

/// The result of adding or removing liquidity from an AMM pool.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LiquidityResult {
    pub pool_address: String,
    pub lp_tokens: Decimal,
    pub base_amount: Decimal,
    pub quote_amount: Decimal,
}

/// A liquidity-provider position held on an AMM venue.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LpPosition {
    pub pool_address: String,
    pub lp_tokens: Decimal,
}

pub type TickerCallback = Box<dyn Fn(Ticker) + Send + Sync>;
pub type TradeCallback = Box<dyn Fn(Trade) + Send + Sync>;
pub type OrderbookCallback = Box<dyn Fn(OrderBook) + Send + Sync>;
pub type OrderCallback = Box<dyn Fn(Order) + Send + Sync>;

/// The abstract surface every venue implementation satisfies.
///
/// Every method dispatches I/O synchronously from the caller's point of
/// view; a concrete adapter is free to run its own transport on a
/// dedicated thread internally rather than block the caller outright, but
/// that is an adapter-side detail, not a second call surface this trait
/// exposes. AMM operations have a default implementation that fails with
/// [`AdapterError::NotSupported`] so a CLOB-only adapter need not override
/// them, and a CLOB adapter invoked with an AMM operation fails the same
/// way rather than panicking or silently succeeding.
pub trait VenueAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn venue_type(&self) -> VenueType;
    fn capabilities(&self) -> &VenueCapabilities;
    fn is_connected(&self) -> bool;

    fn latency_ms(&self) -> Option<i64> {
        None
    }

    fn info(&self) -> VenueInfo {
        VenueInfo {
            name: self.name().to_string(),
            venue_type: self.venue_type(),
            connected: self.is_connected(),
            latency_ms: self.latency_ms(),
            supported_pairs: self.capabilities().supported_pairs.iter().cloned().collect(),
            maker_fee: Decimal::from_f64(0.001),
            taker_fee: Decimal::from_f64(0.002),
        }
    }

    fn connect(&self) -> Result<(), AdapterError>;
    fn disconnect(&self) -> Result<(), AdapterError>;

    fn get_markets(&self) -> Result<Vec<MarketInfo>, AdapterError>;
    fn get_ticker(&self, symbol: &str) -> Result<Ticker, AdapterError>;
    fn get_orderbook(&self, symbol: &str, depth: Option<usize>) -> Result<OrderBook, AdapterError>;
    fn get_trades(&self, symbol: &str, limit: Option<usize>) -> Result<Vec<Trade>, AdapterError>;

    fn get_balances(&self) -> Result<Vec<Balance>, AdapterError>;
    fn get_balance(&self, asset: &str) -> Result<Balance, AdapterError>;
    fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>, AdapterError>;

    fn place_order(&self, request: &OrderRequest) -> Result<Order, AdapterError>;
    fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<Order, AdapterError>;
    fn cancel_all_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>, AdapterError>;

    fn get_swap_quote(
        &self,
        _base_token: &str,
        _quote_token: &str,
        _amount: Decimal,
        _is_buy: bool,
    ) -> Result<SwapQuote, AdapterError> {
        Err(AdapterError::NotSupported("AMM swap".into()))
    }

    fn execute_swap(
        &self,
        _base_token: &str,
        _quote_token: &str,
        _amount: Decimal,
        _is_buy: bool,
        _slippage: Decimal,
    ) -> Result<Trade, AdapterError> {
        Err(AdapterError::NotSupported("AMM swap".into()))
    }

    fn get_pool_info(&self, _base_token: &str, _quote_token: &str) -> Result<PoolInfo, AdapterError> {
        Err(AdapterError::NotSupported("pool info".into()))
    }

    fn add_liquidity(
        &self,
        _base_token: &str,
        _quote_token: &str,
        _base_amount: Decimal,
        _quote_amount: Decimal,
        _slippage: Decimal,
    ) -> Result<LiquidityResult, AdapterError> {
        Err(AdapterError::NotSupported("add liquidity".into()))
    }

    fn remove_liquidity(
        &self,
        _pool_address: &str,
        _liquidity_amount: Decimal,
        _slippage: Decimal,
    ) -> Result<LiquidityResult, AdapterError> {
        Err(AdapterError::NotSupported("remove liquidity".into()))
    }

    fn get_lp_positions(&self) -> Result<Vec<LpPosition>, AdapterError> {
        Err(AdapterError::NotSupported("LP positions".into()))
    }

    fn subscribe_ticker(&self, _symbol: &str, _callback: TickerCallback) {}
    fn subscribe_trades(&self, _symbol: &str, _callback: TradeCallback) {}
    fn subscribe_orderbook(&self, _symbol: &str, _callback: OrderbookCallback) {}
    fn subscribe_orders(&self, _callback: OrderCallback) {}
    fn unsubscribe_all(&self) {}
}
