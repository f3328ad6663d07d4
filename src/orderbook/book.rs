//! A single venue's order book: concurrent writers, snapshot readers.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use tracing::trace;

use crate::decimal::Decimal;
use crate::primitives::Side;
use crate::utils::current_time_millis;

/// A single (price, quantity) level.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Level {
    pub price: Decimal,
    pub quantity: Decimal,
}

struct Inner {
    symbol: String,
    venue: String,
    timestamp_ms: AtomicI64,
    bid_seq: AtomicU64,
    ask_seq: AtomicU64,
    pending_bids: DashMap<u64, Level>,
    pending_asks: DashMap<u64, Level>,
    committed_bids: SkipMap<i64, Decimal>,
    committed_asks: SkipMap<i64, Decimal>,
    sort_lock: Mutex<()>,
}

/// A per-venue order book.
///
/// Writers append levels with [`add_bid`]/[`add_ask`] from any thread
/// without blocking each other beyond the amortized cost of a `DashMap`
/// insert. Readers build a fully merged, coalesced, sorted view on every
/// call, so a level is never observed half-written and a concurrent
/// [`sort`] never exposes an intermediate permutation: the merge always sees
/// either a level's pending entry, its committed entry, or (briefly, during
/// `sort`) both, never neither.
///
/// [`add_bid`]: OrderBook::add_bid
/// [`add_ask`]: OrderBook::add_ask
/// [`sort`]: OrderBook::sort
#[derive(Clone)]
pub struct OrderBook {
    inner: Arc<Inner>,
}

impl OrderBook {
    /// Create an empty book for `symbol` on `venue`.
    pub fn new(symbol: impl Into<String>, venue: impl Into<String>) -> Self {
        OrderBook {
            inner: Arc::new(Inner {
                symbol: symbol.into(),
                venue: venue.into(),
                timestamp_ms: AtomicI64::new(current_time_millis()),
                bid_seq: AtomicU64::new(0),
                ask_seq: AtomicU64::new(0),
                pending_bids: DashMap::new(),
                pending_asks: DashMap::new(),
                committed_bids: SkipMap::new(),
                committed_asks: SkipMap::new(),
                sort_lock: Mutex::new(()),
            }),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.inner.symbol
    }

    pub fn venue(&self) -> &str {
        &self.inner.venue
    }

    /// Milliseconds since epoch of the most recent write.
    pub fn timestamp_ms(&self) -> i64 {
        self.inner.timestamp_ms.load(Ordering::Acquire)
    }

    /// Append a bid level. Rejected (returns `false`) if price or quantity
    /// is not strictly positive.
    pub fn add_bid(&self, price: Decimal, quantity: Decimal) -> bool {
        self.add(Side::Buy, price, quantity)
    }

    /// Append an ask level. Rejected (returns `false`) if price or quantity
    /// is not strictly positive.
    pub fn add_ask(&self, price: Decimal, quantity: Decimal) -> bool {
        self.add(Side::Sell, price, quantity)
    }

    fn add(&self, side: Side, price: Decimal, quantity: Decimal) -> bool {
        if !price.is_positive() || !quantity.is_positive() {
            trace!(symbol = %self.inner.symbol, ?side, "rejected level with non-positive price or quantity");
            return false;
        }
        let level = Level { price, quantity };
        match side {
            Side::Buy => {
                let seq = self.inner.bid_seq.fetch_add(1, Ordering::Relaxed);
                self.inner.pending_bids.insert(seq, level);
            }
            Side::Sell => {
                let seq = self.inner.ask_seq.fetch_add(1, Ordering::Relaxed);
                self.inner.pending_asks.insert(seq, level);
            }
        }
        self.inner
            .timestamp_ms
            .store(current_time_millis(), Ordering::Release);
        true
    }

    /// Fold every pending level into the committed, coalesced state and
    /// clear the pending log. Safe to call concurrently with writers; at
    /// most one `sort()` runs at a time.
    pub fn sort(&self) {
        let _guard = self.inner.sort_lock.lock().unwrap_or_else(|e| e.into_inner());

        Self::drain_into(&self.inner.pending_bids, &self.inner.committed_bids, true);
        Self::drain_into(&self.inner.pending_asks, &self.inner.committed_asks, false);
    }

    fn drain_into(pending: &DashMap<u64, Level>, committed: &SkipMap<i64, Decimal>, negate: bool) {
        let ids: Vec<u64> = pending.iter().map(|e| *e.key()).collect();
        for id in ids {
            if let Some((_, level)) = pending.remove(&id) {
                let key = key_for(level.price, negate);
                let existing = committed.get(&key).map(|e| *e.value()).unwrap_or(Decimal::zero());
                let merged = existing + level.quantity;
                if merged.is_positive() {
                    committed.insert(key, merged);
                } else {
                    committed.remove(&key);
                }
            }
        }
    }

    /// Bid levels, strictly descending by price after coalescing equal
    /// prices by summing quantities.
    pub fn bids(&self) -> Vec<Level> {
        self.merged_side(true)
    }

    /// Ask levels, strictly ascending by price after coalescing equal
    /// prices by summing quantities.
    pub fn asks(&self) -> Vec<Level> {
        self.merged_side(false)
    }

    fn merged_side(&self, is_bid: bool) -> Vec<Level> {
        let (pending, committed) = if is_bid {
            (&self.inner.pending_bids, &self.inner.committed_bids)
        } else {
            (&self.inner.pending_asks, &self.inner.committed_asks)
        };

        let mut by_key: std::collections::BTreeMap<i64, Decimal> = std::collections::BTreeMap::new();
        for entry in committed.iter() {
            by_key.insert(*entry.key(), *entry.value());
        }
        for entry in pending.iter() {
            let level = entry.value();
            let key = key_for(level.price, is_bid);
            let existing = by_key.get(&key).copied().unwrap_or(Decimal::zero());
            by_key.insert(key, existing + level.quantity);
        }

        by_key
            .into_iter()
            .filter(|(_, qty)| qty.is_positive())
            .map(|(key, qty)| Level {
                price: price_from_key(key, is_bid),
                quantity: qty,
            })
            .collect()
    }

    /// Highest bid, if any.
    pub fn best_bid(&self) -> Option<Level> {
        self.bids().into_iter().next()
    }

    /// Lowest ask, if any.
    pub fn best_ask(&self) -> Option<Level> {
        self.asks().into_iter().next()
    }

    /// Midpoint of best bid and best ask; `None` unless both exist.
    pub fn mid_price(&self) -> Option<Decimal> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some((bid.price + ask.price) / Decimal::from_i64(2))
    }

    /// `best_ask - best_bid`; `None` unless both exist.
    pub fn spread(&self) -> Option<Decimal> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(ask.price - bid.price)
    }

    /// Spread as a percentage of the midpoint; `None` unless both exist.
    pub fn spread_percent(&self) -> Option<Decimal> {
        let spread = self.spread()?;
        let mid = self.mid_price()?;
        if mid.is_zero() {
            return None;
        }
        Some(spread / mid * Decimal::from_i64(100))
    }

    /// Sum of quantity across the top `n` bid levels.
    pub fn bid_depth(&self, n: usize) -> Decimal {
        self.bids().into_iter().take(n).map(|l| l.quantity).fold(Decimal::zero(), |a, b| a + b)
    }

    /// Sum of quantity across the top `n` ask levels.
    pub fn ask_depth(&self, n: usize) -> Decimal {
        self.asks().into_iter().take(n).map(|l| l.quantity).fold(Decimal::zero(), |a, b| a + b)
    }

    /// Total quantity resting on the bid side.
    pub fn bid_liquidity(&self) -> Decimal {
        self.bids().into_iter().map(|l| l.quantity).fold(Decimal::zero(), |a, b| a + b)
    }

    /// Total quantity resting on the ask side.
    pub fn ask_liquidity(&self) -> Decimal {
        self.asks().into_iter().map(|l| l.quantity).fold(Decimal::zero(), |a, b| a + b)
    }

    /// `true` if the requested side has at least `qty` available to trade
    /// against (asks for a buy, bids for a sell).
    pub fn has_liquidity(&self, side: Side, qty: Decimal) -> bool {
        match side {
            Side::Buy => self.ask_liquidity() >= qty,
            Side::Sell => self.bid_liquidity() >= qty,
        }
    }

    /// Volume-weighted average price to buy `qty`, walking asks ascending.
    /// `None` if the book cannot supply `qty`.
    pub fn vwap_buy(&self, qty: Decimal) -> Option<Decimal> {
        Self::vwap(self.asks(), qty)
    }

    /// Volume-weighted average price to sell `qty`, walking bids descending.
    /// `None` if the book cannot supply `qty`.
    pub fn vwap_sell(&self, qty: Decimal) -> Option<Decimal> {
        Self::vwap(self.bids(), qty)
    }

    fn vwap(levels: Vec<Level>, qty: Decimal) -> Option<Decimal> {
        if !qty.is_positive() {
            return None;
        }
        let mut remaining = qty;
        let mut notional = Decimal::zero();
        for level in levels {
            if !remaining.is_positive() {
                break;
            }
            let consumed = if level.quantity < remaining { level.quantity } else { remaining };
            notional = notional + level.price * consumed;
            remaining = remaining - consumed;
        }
        if remaining.is_positive() {
            None
        } else {
            Some(notional / qty)
        }
    }
}

fn key_for(price: Decimal, negate_for_bid: bool) -> i64 {
    if negate_for_bid {
        -price.mantissa()
    } else {
        price.mantissa()
    }
}

fn price_from_key(key: i64, negated: bool) -> Decimal {
    Decimal::from_mantissa(if negated { -key } else { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_levels() {
        let book = OrderBook::new("BTC-USDC", "lx");
        assert!(!book.add_bid(Decimal::zero(), Decimal::from_i64(1)));
        assert!(!book.add_bid(Decimal::from_i64(1), Decimal::zero()));
        assert!(!book.add_ask(Decimal::from_i64(-1), Decimal::from_i64(1)));
    }

    #[test]
    fn sort_coalesces_duplicate_prices() {
        let book = OrderBook::new("BTC-USDC", "lx");
        book.add_bid(Decimal::from_i64(100), Decimal::from_i64(1));
        book.add_bid(Decimal::from_i64(100), Decimal::from_i64(2));
        book.add_bid(Decimal::from_i64(99), Decimal::from_i64(5));
        book.sort();

        let bids = book.bids();
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0].price, Decimal::from_i64(100));
        assert_eq!(bids[0].quantity, Decimal::from_i64(3));
        assert_eq!(bids[1].price, Decimal::from_i64(99));
    }

    #[test]
    fn bids_descending_asks_ascending() {
        let book = OrderBook::new("BTC-USDC", "lx");
        book.add_bid(Decimal::from_i64(10), Decimal::from_i64(1));
        book.add_bid(Decimal::from_i64(20), Decimal::from_i64(1));
        book.add_ask(Decimal::from_i64(30), Decimal::from_i64(1));
        book.add_ask(Decimal::from_i64(25), Decimal::from_i64(1));
        book.sort();

        let bids = book.bids();
        let asks = book.asks();
        assert!(bids[0].price > bids[1].price);
        assert!(asks[0].price < asks[1].price);
    }

    #[test]
    fn best_bid_ask_mid_and_spread() {
        let book = OrderBook::new("BTC-USDC", "lx");
        book.add_bid(Decimal::from_i64(99), Decimal::from_i64(1));
        book.add_ask(Decimal::from_i64(101), Decimal::from_i64(1));
        book.sort();

        assert_eq!(book.best_bid().unwrap().price, Decimal::from_i64(99));
        assert_eq!(book.best_ask().unwrap().price, Decimal::from_i64(101));
        assert_eq!(book.mid_price().unwrap(), Decimal::from_i64(100));
        assert_eq!(book.spread().unwrap(), Decimal::from_i64(2));
    }

    #[test]
    fn empty_side_returns_none() {
        let book = OrderBook::new("BTC-USDC", "lx");
        assert!(book.best_bid().is_none());
        assert!(book.mid_price().is_none());
        assert!(book.spread().is_none());
    }

    #[test]
    fn vwap_buy_walks_asks_ascending() {
        let book = OrderBook::new("BTC-USDC", "lx");
        book.add_ask(Decimal::from_i64(100), Decimal::from_i64(1));
        book.add_ask(Decimal::from_i64(101), Decimal::from_i64(1));
        book.sort();

        let vwap = book.vwap_buy(Decimal::from_f64(1.5)).unwrap();
        // 1 @ 100 + 0.5 @ 101 = 150.5, / 1.5 = 100.333...
        assert!((vwap.to_f64() - 100.333_333).abs() < 1e-3);
    }

    #[test]
    fn vwap_insufficient_liquidity_is_none() {
        let book = OrderBook::new("BTC-USDC", "lx");
        book.add_ask(Decimal::from_i64(100), Decimal::from_i64(1));
        book.sort();
        assert!(book.vwap_buy(Decimal::from_i64(2)).is_none());
    }

    #[test]
    fn concurrent_writers_preserve_total_quantity() {
        let book = OrderBook::new("BTC-USDC", "lx");
        std::thread::scope(|scope| {
            for t in 0..4i64 {
                let book = book.clone();
                scope.spawn(move || {
                    for i in 0..250i64 {
                        book.add_bid(Decimal::from_i64(100 + (t * 250 + i) % 50), Decimal::from_i64(1));
                        book.add_ask(Decimal::from_i64(200 + (t * 250 + i) % 50), Decimal::from_i64(1));
                    }
                });
            }
        });
        book.sort();
        assert_eq!(book.bid_liquidity(), Decimal::from_i64(1000));
        assert_eq!(book.ask_liquidity(), Decimal::from_i64(1000));
        let bids = book.bids();
        assert!(bids.len() <= 50);
        for w in bids.windows(2) {
            assert!(w[0].price > w[1].price);
        }
    }
}
