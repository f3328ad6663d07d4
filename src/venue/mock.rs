//! An in-memory adapter used by tests and examples.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::decimal::Decimal;
use crate::orderbook::OrderBook;
use crate::primitives::{Balance, MarketInfo, Order, OrderRequest, OrderStatus, Ticker, Trade};
use crate::utils::current_time_millis;

use super::adapter::{VenueAdapter, VenueType};
use super::capability::VenueCapabilities;
use super::error::AdapterError;

/// A venue adapter backed entirely by in-process state.
///
/// Orders placed against it are accepted immediately at the requested price
/// (or a configured mid for market orders) and marked `Open`; there is no
/// matching engine behind it, since this crate is explicitly a client, not
/// one.
pub struct MockAdapter {
    name: String,
    venue_type: VenueType,
    capabilities: VenueCapabilities,
    connected: AtomicBool,
    next_order_id: AtomicU64,
    orders: Mutex<Vec<Order>>,
    balances: Mutex<Vec<Balance>>,
    book: Mutex<Option<OrderBook>>,
}

impl MockAdapter {
    pub fn new(name: impl Into<String>, venue_type: VenueType) -> Self {
        let capabilities = match venue_type {
            VenueType::Native => VenueCapabilities::clob(),
            VenueType::Ccxt | VenueType::Hummingbot => VenueCapabilities::clob(),
        };
        MockAdapter {
            name: name.into(),
            venue_type,
            capabilities,
            connected: AtomicBool::new(false),
            next_order_id: AtomicU64::new(1),
            orders: Mutex::new(Vec::new()),
            balances: Mutex::new(Vec::new()),
            book: Mutex::new(None),
        }
    }

    /// Install the book this adapter returns from [`get_orderbook`](VenueAdapter::get_orderbook).
    pub fn set_book(&self, book: OrderBook) {
        *self.book.lock().unwrap_or_else(|e| e.into_inner()) = Some(book);
    }

    fn next_id(&self) -> String {
        format!("{}-{}", self.name, self.next_order_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl VenueAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn venue_type(&self) -> VenueType {
        self.venue_type
    }

    fn capabilities(&self) -> &VenueCapabilities {
        &self.capabilities
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn connect(&self) -> Result<(), AdapterError> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    fn disconnect(&self) -> Result<(), AdapterError> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    fn get_markets(&self) -> Result<Vec<MarketInfo>, AdapterError> {
        Ok(Vec::new())
    }

    fn get_ticker(&self, symbol: &str) -> Result<Ticker, AdapterError> {
        let guard = self.book.lock().unwrap_or_else(|e| e.into_inner());
        let book = guard.as_ref().ok_or_else(|| AdapterError::Transport("no book".into()))?;
        let bid = book.best_bid().map(|l| l.price).unwrap_or(Decimal::zero());
        let ask = book.best_ask().map(|l| l.price).unwrap_or(Decimal::zero());
        Ok(Ticker {
            symbol: symbol.to_string(),
            venue: self.name.clone(),
            bid,
            ask,
            last: (bid + ask) / Decimal::from_i64(2),
            timestamp_ms: current_time_millis(),
        })
    }

    fn get_orderbook(&self, _symbol: &str, _depth: Option<usize>) -> Result<OrderBook, AdapterError> {
        let guard = self.book.lock().unwrap_or_else(|e| e.into_inner());
        guard.clone().ok_or_else(|| AdapterError::Transport("no book".into()))
    }

    fn get_trades(&self, _symbol: &str, _limit: Option<usize>) -> Result<Vec<Trade>, AdapterError> {
        Ok(Vec::new())
    }

    fn get_balances(&self) -> Result<Vec<Balance>, AdapterError> {
        Ok(self.balances.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn get_balance(&self, asset: &str) -> Result<Balance, AdapterError> {
        Ok(Balance {
            asset: asset.to_string(),
            free: Decimal::zero(),
            locked: Decimal::zero(),
        })
    }

    fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>, AdapterError> {
        let orders = self.orders.lock().unwrap_or_else(|e| e.into_inner());
        Ok(orders
            .iter()
            .filter(|o| symbol.is_none_or(|s| o.request.symbol == s))
            .filter(|o| matches!(o.status, OrderStatus::Open | OrderStatus::PartiallyFilled | OrderStatus::New))
            .cloned()
            .collect())
    }

    fn place_order(&self, request: &OrderRequest) -> Result<Order, AdapterError> {
        if !self.is_connected() {
            return Err(AdapterError::NotConnected);
        }
        let id = self.next_id();
        let mut order = Order::new(request.clone(), id, self.name.clone());
        order.status = OrderStatus::Open;
        self.orders.lock().unwrap_or_else(|e| e.into_inner()).push(order.clone());
        Ok(order)
    }

    fn cancel_order(&self, order_id: &str, _symbol: &str) -> Result<Order, AdapterError> {
        let mut orders = self.orders.lock().unwrap_or_else(|e| e.into_inner());
        let order = orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| AdapterError::Transport(format!("unknown order {order_id}")))?;
        order.status = OrderStatus::Cancelled;
        Ok(order.clone())
    }

    fn cancel_all_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>, AdapterError> {
        let mut orders = self.orders.lock().unwrap_or_else(|e| e.into_inner());
        let mut cancelled = Vec::new();
        for order in orders.iter_mut() {
            if symbol.is_none_or(|s| order.request.symbol == s) {
                order.status = OrderStatus::Cancelled;
                cancelled.push(order.clone());
            }
        }
        Ok(cancelled)
    }
}

/// Convenience constructor matching a Buy/Sell-agnostic smoke test.
pub fn connected_clob(name: impl Into<String>) -> MockAdapter {
    let adapter = MockAdapter::new(name, VenueType::Native);
    let _ = adapter.connect();
    adapter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{OrderRequest, Side};

    #[test]
    fn place_then_cancel_order() {
        let adapter = MockAdapter::new("lx", VenueType::Native);
        adapter.connect().unwrap();
        let request = OrderRequest::limit("BTC-USDC", Side::Buy, Decimal::from_f64(0.1), Decimal::from_i64(40000));
        let order = adapter.place_order(&request).unwrap();
        assert_eq!(order.status, OrderStatus::Open);

        let cancelled = adapter.cancel_order(&order.order_id, "BTC-USDC").unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[test]
    fn place_order_requires_connection() {
        let adapter = MockAdapter::new("lx", VenueType::Native);
        let request = OrderRequest::market("BTC-USDC", Side::Buy, Decimal::from_i64(1));
        assert_eq!(adapter.place_order(&request), Err(AdapterError::NotConnected));
    }

    #[test]
    fn amm_operations_fail_as_not_supported() {
        let adapter = MockAdapter::new("lx", VenueType::Native);
        let err = adapter.get_swap_quote("BTC", "USDC", Decimal::from_i64(1), true).unwrap_err();
        assert!(matches!(err, AdapterError::NotSupported(_)));
    }
}
