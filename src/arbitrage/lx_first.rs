//! Oracle-vs-stale-venue divergence detector.
//!
//! One venue ("LX") is treated as ground truth because its updates arrive
//! with sub-block latency; every other venue lags by anywhere from tens of
//! milliseconds to seconds. [`LxFirstArbitrage`] watches both streams and
//! emits an opportunity whenever a lagging venue's quote has not yet caught
//! up to the oracle's price.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::decimal::Decimal;
use crate::utils::current_time_millis;

use super::types::{LxFirstOpportunity, LxPrice, StaleSide, VenuePrice};

/// Callback invoked once, synchronously, per emitted opportunity.
pub type LxFirstCallback = Box<dyn Fn(LxFirstOpportunity) + Send + Sync>;

/// Tunables for [`LxFirstArbitrage`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LxFirstConfig {
    /// A venue price older than this (ms) is assumed to have already caught
    /// up and is skipped rather than treated as exploitable.
    pub max_staleness_ms: i64,
    /// Minimum divergence, in basis points of the oracle mid, to consider.
    pub min_divergence_bps: Decimal,
    /// Minimum expected profit (at `max_position_size`) to emit.
    pub min_profit: Decimal,
    /// Notional used to size `expected_profit` (not an execution instruction).
    pub max_position_size: Decimal,
}

impl Default for LxFirstConfig {
    fn default() -> Self {
        LxFirstConfig {
            max_staleness_ms: 5_000,
            min_divergence_bps: Decimal::from_i64(5),
            min_profit: Decimal::zero(),
            max_position_size: Decimal::from_i64(1),
        }
    }
}

/// Detects divergence between an oracle venue's price and every other
/// venue's (possibly stale) quote for the same symbol.
pub struct LxFirstArbitrage {
    config: LxFirstConfig,
    running: AtomicBool,
    lx_prices: Mutex<HashMap<String, LxPrice>>,
    venue_prices: Mutex<HashMap<String, Vec<VenuePrice>>>,
    callbacks: Mutex<Vec<LxFirstCallback>>,
}

impl LxFirstArbitrage {
    pub fn new(config: LxFirstConfig) -> Self {
        LxFirstArbitrage {
            config,
            running: AtomicBool::new(false),
            lx_prices: Mutex::new(HashMap::new()),
            venue_prices: Mutex::new(HashMap::new()),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn on_opportunity(&self, callback: LxFirstCallback) {
        self.callbacks.lock().unwrap_or_else(|e| e.into_inner()).push(callback);
    }

    /// Records the latest oracle price and immediately checks every known
    /// venue price for this symbol against it.
    pub fn update_lx_price(&self, price: LxPrice) {
        let symbol = price.symbol.clone();
        self.lx_prices.lock().unwrap_or_else(|e| e.into_inner()).insert(symbol.clone(), price);
        self.check_opportunities(&symbol);
    }

    /// Records (or replaces, by venue name) the latest quote for a venue.
    /// Does not itself trigger a check; the oracle update is the trigger.
    pub fn update_venue_price(&self, price: VenuePrice) {
        let mut venue_prices = self.venue_prices.lock().unwrap_or_else(|e| e.into_inner());
        let entries = venue_prices.entry(price.symbol.clone()).or_default();
        match entries.iter_mut().find(|p| p.venue == price.venue) {
            Some(existing) => *existing = price,
            None => entries.push(price),
        }
    }

    fn check_opportunities(&self, symbol: &str) {
        if !self.is_running() {
            return;
        }

        let lx_price = {
            let lx_prices = self.lx_prices.lock().unwrap_or_else(|e| e.into_inner());
            let Some(price) = lx_prices.get(symbol) else { return };
            price.clone()
        };

        let venue_prices = {
            let venue_prices = self.venue_prices.lock().unwrap_or_else(|e| e.into_inner());
            let Some(prices) = venue_prices.get(symbol) else { return };
            prices.clone()
        };

        let now = current_time_millis();

        for vp in &venue_prices {
            let staleness = now - vp.timestamp_ms;
            if staleness > self.config.max_staleness_ms {
                continue;
            }

            if vp.ask < lx_price.mid {
                let divergence = lx_price.mid - vp.ask;
                self.maybe_emit(symbol, &lx_price, vp, staleness, StaleSide::Buy, divergence);
            }

            if vp.bid > lx_price.mid {
                let divergence = vp.bid - lx_price.mid;
                self.maybe_emit(symbol, &lx_price, vp, staleness, StaleSide::Sell, divergence);
            }
        }
    }

    fn maybe_emit(
        &self,
        symbol: &str,
        lx_price: &LxPrice,
        vp: &VenuePrice,
        staleness: i64,
        side: StaleSide,
        divergence: Decimal,
    ) {
        if lx_price.mid.is_zero() {
            return;
        }
        let divergence_bps = divergence / lx_price.mid * Decimal::from_i64(10_000);
        if divergence_bps < self.config.min_divergence_bps {
            return;
        }

        let opportunity = self.create_opportunity(symbol, lx_price, vp, staleness, side, divergence, divergence_bps);
        if opportunity.expected_profit < self.config.min_profit {
            return;
        }

        let callbacks = self.callbacks.lock().unwrap_or_else(|e| e.into_inner());
        for callback in callbacks.iter() {
            callback(opportunity.clone());
        }
    }

    fn create_opportunity(
        &self,
        symbol: &str,
        lx_price: &LxPrice,
        vp: &VenuePrice,
        staleness: i64,
        side: StaleSide,
        divergence: Decimal,
        divergence_bps: Decimal,
    ) -> LxFirstOpportunity {
        let now = current_time_millis();
        let expected_profit = divergence * self.config.max_position_size;
        let confidence = Self::calculate_confidence(staleness, divergence_bps);

        LxFirstOpportunity {
            id: format!("{symbol}-{}-{}-{now}", vp.venue, side.as_str()),
            symbol: symbol.to_string(),
            timestamp_ms: now,
            lx_price: lx_price.clone(),
            stale_venue: vp.venue.clone(),
            stale_price: vp.clone(),
            staleness_ms: staleness,
            side,
            divergence,
            divergence_bps,
            expected_profit,
            max_size: self.config.max_position_size,
            confidence,
        }
    }

    /// Higher when the venue is more stale (it has had less time to catch
    /// up) and when the divergence is larger (more room for profit).
    fn calculate_confidence(staleness_ms: i64, divergence_bps: Decimal) -> f64 {
        let staleness_score = (1.0 - staleness_ms as f64 / 5_000.0).max(0.0);
        let divergence_score = (divergence_bps.to_f64() / 100.0).min(1.0);
        0.5 * staleness_score + 0.5 * divergence_score
    }
}
