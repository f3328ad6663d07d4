//! Multi-adapter façade: connect/disconnect, aggregation, smart routing.

mod error;

pub use error::ClientError;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::decimal::Decimal;
use crate::orderbook::{AggregatedOrderbook, OrderBook};
use crate::primitives::{AggregatedBalance, Balance, Order, OrderRequest, OrderType, Side, Ticker};
use crate::risk::{RiskConfig, RiskManager};
use crate::venue::VenueAdapter;

/// Client-wide tunables beyond per-venue configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientConfig {
    pub smart_routing: bool,
    pub min_improvement_bps: Decimal,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            smart_routing: false,
            min_improvement_bps: Decimal::from_i64(5),
        }
    }
}

/// Owns a set of venue adapters and a [`RiskManager`], and presents them as
/// one coherent trading surface.
pub struct TradingClient {
    config: ClientConfig,
    venues: HashMap<String, Arc<dyn VenueAdapter>>,
    default_venue: Mutex<Option<String>>,
    risk_manager: RiskManager,
}

impl TradingClient {
    pub fn new(config: ClientConfig, risk_config: RiskConfig) -> Self {
        TradingClient {
            config,
            venues: HashMap::new(),
            default_venue: Mutex::new(None),
            risk_manager: RiskManager::new(risk_config),
        }
    }

    /// Register an adapter under its own name. Call before [`connect`](Self::connect).
    pub fn add_venue(&mut self, adapter: Arc<dyn VenueAdapter>) {
        self.venues.insert(adapter.name().to_string(), adapter);
    }

    pub fn risk_manager(&self) -> &RiskManager {
        &self.risk_manager
    }

    pub fn venue(&self, name: &str) -> Option<Arc<dyn VenueAdapter>> {
        self.venues.get(name).cloned()
    }

    /// Connects every registered adapter. Partial failure is reported per
    /// venue; one adapter failing to connect does not roll back the others.
    pub fn connect(&self) -> Vec<(String, Result<(), ClientError>)> {
        let mut results = Vec::new();
        for (name, adapter) in &self.venues {
            let outcome = adapter.connect().map_err(ClientError::from);
            if outcome.is_ok() {
                info!(venue = %name, "connected");
                let mut default_venue = self.default_venue.lock().unwrap_or_else(|e| e.into_inner());
                if default_venue.is_none() {
                    *default_venue = Some(name.clone());
                }
            } else {
                warn!(venue = %name, "failed to connect");
            }
            results.push((name.clone(), outcome));
        }
        results
    }

    /// Disconnects every registered adapter. Partial failure is reported per
    /// venue.
    pub fn disconnect(&self) -> Vec<(String, Result<(), ClientError>)> {
        self.venues
            .iter()
            .map(|(name, adapter)| (name.clone(), adapter.disconnect().map_err(ClientError::from)))
            .collect()
    }

    fn resolve_venue(&self, venue: Option<&str>) -> Result<Arc<dyn VenueAdapter>, ClientError> {
        let name = match venue {
            Some(name) => name.to_string(),
            None => self
                .default_venue
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
                .ok_or(ClientError::NoDefaultVenue)?,
        };
        self.venues.get(&name).cloned().ok_or(ClientError::UnknownVenue(name))
    }

    pub fn orderbook(&self, symbol: &str, venue: Option<&str>) -> Result<OrderBook, ClientError> {
        Ok(self.resolve_venue(venue)?.get_orderbook(symbol, None)?)
    }

    /// Fetches every connected venue's book for `symbol` and merges them.
    /// A venue whose fetch fails is skipped rather than failing the whole
    /// call.
    pub fn aggregated_orderbook(&self, symbol: &str) -> AggregatedOrderbook {
        let agg = AggregatedOrderbook::new(symbol);
        for adapter in self.venues.values() {
            if !adapter.is_connected() {
                continue;
            }
            match adapter.get_orderbook(symbol, None) {
                Ok(book) => agg.add_orderbook(book),
                Err(e) => debug!(venue = adapter.name(), error = %e, "skipping venue in aggregation"),
            }
        }
        agg
    }

    pub fn ticker(&self, symbol: &str, venue: Option<&str>) -> Result<Ticker, ClientError> {
        Ok(self.resolve_venue(venue)?.get_ticker(symbol)?)
    }

    pub fn tickers(&self, symbol: &str) -> Vec<Ticker> {
        self.venues
            .values()
            .filter(|a| a.is_connected())
            .filter_map(|a| a.get_ticker(symbol).ok())
            .collect()
    }

    pub fn balance(&self, asset: &str, venue: Option<&str>) -> Result<Balance, ClientError> {
        Ok(self.resolve_venue(venue)?.get_balance(asset)?)
    }

    /// Aggregated balance per asset, summed across every connected venue.
    pub fn balances(&self) -> HashMap<String, AggregatedBalance> {
        let mut by_asset: HashMap<String, AggregatedBalance> = HashMap::new();
        for adapter in self.venues.values() {
            if !adapter.is_connected() {
                continue;
            }
            let Ok(balances) = adapter.get_balances() else { continue };
            for balance in balances {
                by_asset
                    .entry(balance.asset.clone())
                    .or_default()
                    .add_venue(adapter.name(), balance);
            }
        }
        by_asset
    }

    pub fn buy(&self, symbol: &str, quantity: Decimal, venue: Option<&str>) -> Result<Order, ClientError> {
        let mut req = OrderRequest::market(symbol, Side::Buy, quantity);
        if let Some(v) = venue {
            req = req.with_venue(v);
        }
        self.place_order(req)
    }

    pub fn sell(&self, symbol: &str, quantity: Decimal, venue: Option<&str>) -> Result<Order, ClientError> {
        let mut req = OrderRequest::market(symbol, Side::Sell, quantity);
        if let Some(v) = venue {
            req = req.with_venue(v);
        }
        self.place_order(req)
    }

    pub fn limit_buy(&self, symbol: &str, quantity: Decimal, price: Decimal, venue: Option<&str>) -> Result<Order, ClientError> {
        let mut req = OrderRequest::limit(symbol, Side::Buy, quantity, price);
        if let Some(v) = venue {
            req = req.with_venue(v);
        }
        self.place_order(req)
    }

    pub fn limit_sell(&self, symbol: &str, quantity: Decimal, price: Decimal, venue: Option<&str>) -> Result<Order, ClientError> {
        let mut req = OrderRequest::limit(symbol, Side::Sell, quantity, price);
        if let Some(v) = venue {
            req = req.with_venue(v);
        }
        self.place_order(req)
    }

    /// Validates `request` against the risk manager, resolves a venue
    /// (explicit, smart-routed, or default) and dispatches it.
    pub fn place_order(&self, request: OrderRequest) -> Result<Order, ClientError> {
        self.risk_manager.validate(&request)?;

        let venue_name = match &request.venue {
            Some(name) => name.clone(),
            None => self
                .smart_route(&request)
                .or_else(|| self.default_venue.lock().unwrap_or_else(|e| e.into_inner()).clone())
                .ok_or(ClientError::NoDefaultVenue)?,
        };

        let adapter = self.venues.get(&venue_name).cloned().ok_or_else(|| ClientError::UnknownVenue(venue_name))?;
        Ok(adapter.place_order(&request)?)
    }

    pub fn cancel_order(&self, order_id: &str, symbol: &str, venue: &str) -> Result<Order, ClientError> {
        let adapter = self.venues.get(venue).cloned().ok_or_else(|| ClientError::UnknownVenue(venue.to_string()))?;
        Ok(adapter.cancel_order(order_id, symbol)?)
    }

    pub fn cancel_all_orders(&self, symbol: Option<&str>, venue: Option<&str>) -> Result<Vec<Order>, ClientError> {
        match venue {
            Some(name) => {
                let adapter = self.venues.get(name).cloned().ok_or_else(|| ClientError::UnknownVenue(name.to_string()))?;
                Ok(adapter.cancel_all_orders(symbol)?)
            }
            None => {
                let mut cancelled = Vec::new();
                for adapter in self.venues.values() {
                    if let Ok(mut orders) = adapter.cancel_all_orders(symbol) {
                        cancelled.append(&mut orders);
                    }
                }
                Ok(cancelled)
            }
        }
    }

    pub fn open_orders(&self, symbol: Option<&str>) -> Vec<Order> {
        self.venues
            .values()
            .filter_map(|a| a.get_open_orders(symbol).ok())
            .flatten()
            .collect()
    }

    /// Chooses the venue whose advertised price best serves `request`,
    /// subject to connection, capability, and a minimum improvement over
    /// the default venue (to avoid flapping between near-identical quotes).
    /// Returns `None` if smart routing is disabled or no venue clears the
    /// bar, in which case the caller falls back to the default venue.
    fn smart_route(&self, request: &OrderRequest) -> Option<String> {
        if !self.config.smart_routing {
            return None;
        }
        let default_venue = self.default_venue.lock().unwrap_or_else(|e| e.into_inner()).clone()?;

        let agg = self.aggregated_orderbook(&request.symbol);
        let levels = match request.side {
            Side::Buy => agg.aggregated_asks(),
            Side::Sell => agg.aggregated_bids(),
        };
        if levels.is_empty() {
            return None;
        }

        let default_price = levels.iter().find(|l| l.venue == default_venue).map(|l| l.price);

        let eligible = levels.iter().find(|l| {
            self.venues
                .get(&l.venue)
                .map(|a| a.is_connected() && Self::supports(a.as_ref(), request))
                .unwrap_or(false)
        })?;

        let Some(default_price) = default_price else {
            return Some(eligible.venue.clone());
        };
        if default_price.is_zero() {
            return Some(eligible.venue.clone());
        }

        let improvement_bps = match request.side {
            Side::Buy => (default_price - eligible.price) / default_price * Decimal::from_i64(10_000),
            Side::Sell => (eligible.price - default_price) / default_price * Decimal::from_i64(10_000),
        };

        if improvement_bps >= self.config.min_improvement_bps {
            Some(eligible.venue.clone())
        } else {
            None
        }
    }

    fn supports(adapter: &dyn VenueAdapter, request: &OrderRequest) -> bool {
        let caps = adapter.capabilities();
        match request.order_type {
            OrderType::Market => caps.market_orders,
            OrderType::Limit | OrderType::PostOnly | OrderType::Ioc | OrderType::Fok => caps.limit_orders,
            OrderType::Stop | OrderType::StopLimit => caps.stop_orders,
        }
    }
}
