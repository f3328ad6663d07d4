//! Scanner/executor pipeline over the aggregated order book.
//!
//! [`UnifiedArbitrage`] runs two background threads: a scanner that polls the
//! trading client's aggregated book for each configured symbol and queues
//! opportunities, and an executor that drains the queue and places both legs
//! of each trade.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::client::TradingClient;
use crate::decimal::Decimal;
use crate::primitives::{OrderRequest, Side};
use crate::utils::current_time_millis;

use super::types::{ExecutionStatus, UnifiedArbStats, UnifiedExecution, UnifiedOpportunity};

const QUEUE_CAPACITY: usize = 1000;
const OPPORTUNITY_LIFETIME_MS: i64 = 5_000;
const EXECUTOR_IDLE_SLEEP_MS: u64 = 10;
const TOTAL_FEE_RATE: f64 = 0.002;

/// Callback invoked once per queued opportunity, on the scanner thread.
pub type UnifiedCallback = Box<dyn Fn(UnifiedOpportunity) + Send + Sync>;

/// Tunables for [`UnifiedArbitrage`].
#[derive(Debug, Clone)]
pub struct UnifiedArbConfig {
    pub symbols: Vec<String>,
    pub scan_interval_ms: u64,
    pub min_spread_bps: Decimal,
    pub min_profit: Decimal,
    pub max_position_size: Decimal,
}

impl Default for UnifiedArbConfig {
    fn default() -> Self {
        UnifiedArbConfig {
            symbols: Vec::new(),
            scan_interval_ms: 1_000,
            min_spread_bps: Decimal::from_i64(10),
            min_profit: Decimal::zero(),
            max_position_size: Decimal::from_i64(1),
        }
    }
}

struct Shared {
    running: AtomicBool,
    queue: Mutex<VecDeque<UnifiedOpportunity>>,
    callbacks: Mutex<Vec<UnifiedCallback>>,
    executions: Mutex<Vec<UnifiedExecution>>,
    total_pnl: Mutex<Decimal>,
}

/// Scans the aggregated book for cross-venue spreads and executes whatever
/// clears the configured profit bar. Owns two worker threads, joined on
/// [`stop`](Self::stop) or on drop.
pub struct UnifiedArbitrage {
    client: Arc<TradingClient>,
    config: UnifiedArbConfig,
    shared: Arc<Shared>,
    scan_thread: Mutex<Option<JoinHandle<()>>>,
    execute_thread: Mutex<Option<JoinHandle<()>>>,
}

impl UnifiedArbitrage {
    pub fn new(client: Arc<TradingClient>, config: UnifiedArbConfig) -> Self {
        UnifiedArbitrage {
            client,
            config,
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                queue: Mutex::new(VecDeque::new()),
                callbacks: Mutex::new(Vec::new()),
                executions: Mutex::new(Vec::new()),
                total_pnl: Mutex::new(Decimal::zero()),
            }),
            scan_thread: Mutex::new(None),
            execute_thread: Mutex::new(None),
        }
    }

    pub fn on_opportunity(&self, callback: UnifiedCallback) {
        self.shared.callbacks.lock().unwrap_or_else(|e| e.into_inner()).push(callback);
    }

    /// Starts the scanner and executor threads. A no-op if already running.
    pub fn start(&self) {
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return;
        }

        let scan_shared = self.shared.clone();
        let scan_client = self.client.clone();
        let scan_config = self.config.clone();
        *self.scan_thread.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(thread::spawn(move || scan_loop(scan_client, scan_config, scan_shared)));

        let exec_shared = self.shared.clone();
        let exec_client = self.client.clone();
        *self.execute_thread.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(thread::spawn(move || execute_loop(exec_client, exec_shared)));
    }

    /// Signals both loops to exit and joins them. Idempotent.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.scan_thread.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.execute_thread.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = handle.join();
        }
    }

    pub fn get_stats(&self) -> UnifiedArbStats {
        let executions = self.shared.executions.lock().unwrap_or_else(|e| e.into_inner());
        let total_pnl = *self.shared.total_pnl.lock().unwrap_or_else(|e| e.into_inner());
        let mut stats = UnifiedArbStats::from_executions(&executions);
        stats.total_pnl = total_pnl;
        stats
    }

    pub fn executions(&self) -> Vec<UnifiedExecution> {
        self.shared.executions.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Drop for UnifiedArbitrage {
    fn drop(&mut self) {
        self.stop();
    }
}

fn scan_loop(client: Arc<TradingClient>, config: UnifiedArbConfig, shared: Arc<Shared>) {
    while shared.running.load(Ordering::Acquire) {
        for symbol in &config.symbols {
            let Some(opportunity) = find_opportunity(&client, &config, symbol) else { continue };
            if opportunity.net_profit <= config.min_profit {
                continue;
            }

            {
                let mut queue = shared.queue.lock().unwrap_or_else(|e| e.into_inner());
                if queue.len() < QUEUE_CAPACITY {
                    queue.push_back(opportunity.clone());
                } else {
                    debug!(symbol = %symbol, "opportunity queue full, dropping newest");
                }
            }

            let callbacks = shared.callbacks.lock().unwrap_or_else(|e| e.into_inner());
            for callback in callbacks.iter() {
                callback(opportunity.clone());
            }
        }

        thread::sleep(Duration::from_millis(config.scan_interval_ms));
    }
}

fn find_opportunity(client: &TradingClient, config: &UnifiedArbConfig, symbol: &str) -> Option<UnifiedOpportunity> {
    let book = client.aggregated_orderbook(symbol);
    let best_bid = book.best_bid()?;
    let best_ask = book.best_ask()?;

    if best_bid.price <= best_ask.price {
        return None;
    }

    let spread = best_bid.price - best_ask.price;
    let spread_bps = spread / best_ask.price * Decimal::from_i64(10_000);
    if spread_bps < config.min_spread_bps {
        return None;
    }

    let max_size = [best_bid.quantity, best_ask.quantity, config.max_position_size]
        .into_iter()
        .fold(Decimal::from_i64(i64::MAX), |acc, v| if v < acc { v } else { acc });

    let gross_profit = spread * max_size;
    let est_fees = best_ask.price * max_size * Decimal::from_f64(TOTAL_FEE_RATE);
    let net_profit = gross_profit - est_fees;

    let now = current_time_millis();

    Some(UnifiedOpportunity {
        id: format!("arb-{symbol}-{now}"),
        symbol: symbol.to_string(),
        created_at_ms: now,
        expires_at_ms: now + OPPORTUNITY_LIFETIME_MS,
        buy_venue: best_ask.venue,
        buy_price: best_ask.price,
        buy_size: best_ask.quantity,
        sell_venue: best_bid.venue,
        sell_price: best_bid.price,
        sell_size: best_bid.quantity,
        spread,
        spread_bps,
        max_size,
        gross_profit,
        est_fees,
        net_profit,
        confidence: 0.8,
        latency_ms: 0,
    })
}

fn execute_loop(client: Arc<TradingClient>, shared: Arc<Shared>) {
    while shared.running.load(Ordering::Acquire) {
        let opportunity = {
            let mut queue = shared.queue.lock().unwrap_or_else(|e| e.into_inner());
            queue.pop_front()
        };

        let Some(opportunity) = opportunity else {
            thread::sleep(Duration::from_millis(EXECUTOR_IDLE_SLEEP_MS));
            continue;
        };

        let result = execute_opportunity(&client, opportunity);

        {
            let mut total_pnl = shared.total_pnl.lock().unwrap_or_else(|e| e.into_inner());
            *total_pnl = *total_pnl + result.actual_profit;
        }
        shared.executions.lock().unwrap_or_else(|e| e.into_inner()).push(result);
    }
}

fn execute_opportunity(client: &TradingClient, opportunity: UnifiedOpportunity) -> UnifiedExecution {
    let now = current_time_millis();

    if now > opportunity.expires_at_ms {
        return UnifiedExecution {
            id: opportunity.id.clone(),
            opportunity,
            start_ms: now,
            end_ms: now,
            status: ExecutionStatus::Expired,
            buy_order_id: None,
            sell_order_id: None,
            actual_profit: Decimal::zero(),
            fees: Decimal::zero(),
            error: Some("opportunity expired".to_string()),
        };
    }

    let buy_request = OrderRequest::limit(
        opportunity.symbol.clone(),
        Side::Buy,
        opportunity.max_size,
        opportunity.buy_price,
    )
    .with_venue(opportunity.buy_venue.clone());

    let sell_request = OrderRequest::limit(
        opportunity.symbol.clone(),
        Side::Sell,
        opportunity.max_size,
        opportunity.sell_price,
    )
    .with_venue(opportunity.sell_venue.clone());

    match (client.place_order(buy_request), client.place_order(sell_request)) {
        (Ok(buy_order), Ok(sell_order)) => {
            let (actual_profit, fees) = match (buy_order.average_price, sell_order.average_price) {
                (Some(buy_avg), Some(sell_avg)) => {
                    let buy_value = buy_avg * buy_order.filled_quantity;
                    let sell_value = sell_avg * sell_order.filled_quantity;
                    let buy_fees = buy_order.fees.iter().fold(Decimal::zero(), |acc, f| acc + f.amount);
                    let sell_fees = sell_order.fees.iter().fold(Decimal::zero(), |acc, f| acc + f.amount);
                    let fees = buy_fees + sell_fees;
                    (sell_value - buy_value - fees, fees)
                }
                _ => (Decimal::zero(), Decimal::zero()),
            };

            UnifiedExecution {
                id: opportunity.id.clone(),
                opportunity,
                start_ms: now,
                end_ms: current_time_millis(),
                status: ExecutionStatus::Completed,
                buy_order_id: Some(buy_order.order_id),
                sell_order_id: Some(sell_order.order_id),
                actual_profit,
                fees,
                error: None,
            }
        }
        (buy_result, sell_result) => {
            warn!(symbol = %opportunity.symbol, "unified arb leg failed");
            let error = buy_result
                .err()
                .or_else(|| sell_result.err())
                .map(|e| e.to_string());
            UnifiedExecution {
                id: opportunity.id.clone(),
                opportunity,
                start_ms: now,
                end_ms: current_time_millis(),
                status: ExecutionStatus::Failed,
                buy_order_id: None,
                sell_order_id: None,
                actual_profit: Decimal::zero(),
                fees: Decimal::zero(),
                error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::orderbook::OrderBook;
    use crate::risk::RiskConfig;
    use crate::venue::mock::MockAdapter;
    use crate::venue::{VenueAdapter, VenueType};

    fn client_with_crossed_book() -> Arc<TradingClient> {
        let mut client = TradingClient::new(ClientConfig::default(), RiskConfig::default());

        let venue_a = MockAdapter::new("venueA", VenueType::Native);
        let book_a = OrderBook::new("BTC-USDC", "venueA");
        book_a.add_bid(Decimal::from_i64(100), Decimal::from_i64(1));
        book_a.sort();
        venue_a.set_book(book_a);
        venue_a.connect().unwrap();
        client.add_venue(Arc::new(venue_a));

        let venue_b = MockAdapter::new("venueB", VenueType::Native);
        let book_b = OrderBook::new("BTC-USDC", "venueB");
        book_b.add_ask(Decimal::from_i64(99), Decimal::from_i64(1));
        book_b.sort();
        venue_b.set_book(book_b);
        venue_b.connect().unwrap();
        client.add_venue(Arc::new(venue_b));

        Arc::new(client)
    }

    #[test]
    fn finds_opportunity_above_min_spread() {
        let client = client_with_crossed_book();
        let config = UnifiedArbConfig {
            symbols: vec!["BTC-USDC".to_string()],
            min_spread_bps: Decimal::from_i64(10),
            ..Default::default()
        };
        let opp = find_opportunity(&client, &config, "BTC-USDC").unwrap();
        assert_eq!(opp.spread, Decimal::from_i64(1));
        assert!((opp.spread_bps.to_f64() - 101.0).abs() < 1.0);
        assert_eq!(opp.max_size, Decimal::from_i64(1));
        assert_eq!(opp.gross_profit, Decimal::from_i64(1));
        assert!((opp.net_profit.to_f64() - 0.802).abs() < 0.01);
    }

    #[test]
    fn min_profit_filters_out_small_opportunities() {
        let client = client_with_crossed_book();
        let config = UnifiedArbConfig {
            symbols: vec!["BTC-USDC".to_string()],
            min_spread_bps: Decimal::from_i64(10),
            min_profit: Decimal::from_i64(10),
            ..Default::default()
        };
        let opp = find_opportunity(&client, &config, "BTC-USDC").unwrap();
        assert!(opp.net_profit <= config.min_profit);
    }

    #[test]
    fn expired_opportunity_is_not_executed() {
        let client = client_with_crossed_book();
        let config = UnifiedArbConfig {
            symbols: vec!["BTC-USDC".to_string()],
            ..Default::default()
        };
        let mut opp = find_opportunity(&client, &config, "BTC-USDC").unwrap();
        opp.expires_at_ms = current_time_millis() - 1_000;

        let result = execute_opportunity(&client, opp);
        assert_eq!(result.status, ExecutionStatus::Expired);
        assert!(result.buy_order_id.is_none());
        assert!(result.sell_order_id.is_none());
    }

    #[test]
    fn start_stop_is_idempotent_and_joins_threads() {
        let client = client_with_crossed_book();
        let engine = UnifiedArbitrage::new(
            client,
            UnifiedArbConfig {
                symbols: vec!["BTC-USDC".to_string()],
                scan_interval_ms: 5,
                ..Default::default()
            },
        );
        engine.start();
        engine.start();
        thread::sleep(Duration::from_millis(20));
        engine.stop();
        engine.stop();
    }
}
