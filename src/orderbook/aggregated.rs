//! Cross-venue aggregation over per-venue order books.

use dashmap::DashMap;

use crate::decimal::Decimal;

use super::book::{Level, OrderBook};

/// A level in an aggregated view, attributed to the venue it came from.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AggregatedLevel {
    pub price: Decimal,
    pub quantity: Decimal,
    pub venue: String,
}

/// Merges each venue's latest [`OrderBook`] snapshot for one symbol into a
/// cross-venue view. Levels at the same price from different venues are
/// never merged into one another; each keeps its own venue attribution.
pub struct AggregatedOrderbook {
    symbol: String,
    books: DashMap<String, OrderBook>,
}

impl AggregatedOrderbook {
    pub fn new(symbol: impl Into<String>) -> Self {
        AggregatedOrderbook {
            symbol: symbol.into(),
            books: DashMap::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Snapshot `book` under its venue name, replacing any prior snapshot
    /// from that same venue.
    pub fn add_orderbook(&self, book: OrderBook) {
        self.books.insert(book.venue().to_string(), book);
    }

    /// Every aggregated bid level, globally sorted descending by price; ties
    /// between venues at a price are ordered lexicographically by venue.
    pub fn aggregated_bids(&self) -> Vec<AggregatedLevel> {
        self.aggregated_side(true)
    }

    /// Every aggregated ask level, globally sorted ascending by price; ties
    /// between venues at a price are ordered lexicographically by venue.
    pub fn aggregated_asks(&self) -> Vec<AggregatedLevel> {
        self.aggregated_side(false)
    }

    fn aggregated_side(&self, is_bid: bool) -> Vec<AggregatedLevel> {
        let mut levels: Vec<AggregatedLevel> = Vec::new();
        for entry in self.books.iter() {
            let venue = entry.key().clone();
            let book_levels: Vec<Level> = if is_bid { entry.value().bids() } else { entry.value().asks() };
            for level in book_levels {
                levels.push(AggregatedLevel {
                    price: level.price,
                    quantity: level.quantity,
                    venue: venue.clone(),
                });
            }
        }
        levels.sort_by(|a, b| {
            let price_order = if is_bid {
                b.price.cmp(&a.price)
            } else {
                a.price.cmp(&b.price)
            };
            price_order.then_with(|| a.venue.cmp(&b.venue))
        });
        levels
    }

    /// The globally highest bid across every venue; ties broken by venue
    /// name, lexicographically ascending.
    pub fn best_bid(&self) -> Option<AggregatedLevel> {
        self.aggregated_bids().into_iter().next()
    }

    /// The globally lowest ask across every venue; ties broken by venue
    /// name, lexicographically ascending.
    pub fn best_ask(&self) -> Option<AggregatedLevel> {
        self.aggregated_asks().into_iter().next()
    }

    /// Scans asks ascending by price and returns the first single venue
    /// whose own top-of-book depth (not summed across venues) can alone
    /// supply `qty`, along with the price level at which that venue's
    /// cumulative depth reaches `qty`.
    pub fn best_venue_buy(&self, qty: Decimal) -> Option<(String, Decimal)> {
        self.best_venue(qty, true)
    }

    /// Mirror of [`best_venue_buy`](Self::best_venue_buy) over bids.
    pub fn best_venue_sell(&self, qty: Decimal) -> Option<(String, Decimal)> {
        self.best_venue(qty, false)
    }

    fn best_venue(&self, qty: Decimal, is_buy_side: bool) -> Option<(String, Decimal)> {
        // Buying consumes asks (is_bid=false); selling consumes bids (is_bid=true).
        let levels = self.aggregated_side(!is_buy_side);

        let mut by_venue: std::collections::BTreeMap<&str, Vec<&AggregatedLevel>> = std::collections::BTreeMap::new();
        for level in &levels {
            by_venue.entry(level.venue.as_str()).or_default().push(level);
        }

        let mut best: Option<(String, Decimal, Decimal)> = None; // (venue, reach_price, first_price)
        for (venue, venue_levels) in by_venue {
            let mut remaining = qty;
            let mut reach_price = None;
            for level in &venue_levels {
                if !remaining.is_positive() {
                    break;
                }
                let consumed = if level.quantity < remaining { level.quantity } else { remaining };
                remaining = remaining - consumed;
                reach_price = Some(level.price);
                if !remaining.is_positive() {
                    break;
                }
            }
            if remaining.is_positive() {
                continue;
            }
            let Some(reach) = reach_price else { continue };
            let first_price = venue_levels[0].price;
            let better = match &best {
                None => true,
                Some((_, _, best_first)) => {
                    if is_buy_side {
                        first_price < *best_first
                    } else {
                        first_price > *best_first
                    }
                }
            };
            if better {
                best = Some((venue.to_string(), reach, first_price));
            }
        }
        best.map(|(venue, reach, _)| (venue, reach))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_at_same_price_are_not_merged() {
        let agg = AggregatedOrderbook::new("BTC-USDC");
        let a = OrderBook::new("BTC-USDC", "venueA");
        a.add_bid(Decimal::from_i64(100), Decimal::from_i64(1));
        a.sort();
        let b = OrderBook::new("BTC-USDC", "venueB");
        b.add_bid(Decimal::from_i64(100), Decimal::from_i64(2));
        b.sort();
        agg.add_orderbook(a);
        agg.add_orderbook(b);

        let bids = agg.aggregated_bids();
        assert_eq!(bids.len(), 2);
        assert!(bids.iter().any(|l| l.venue == "venueA" && l.quantity == Decimal::from_i64(1)));
        assert!(bids.iter().any(|l| l.venue == "venueB" && l.quantity == Decimal::from_i64(2)));
    }

    #[test]
    fn best_bid_picks_global_max_with_venue_tiebreak() {
        let agg = AggregatedOrderbook::new("BTC-USDC");
        let a = OrderBook::new("BTC-USDC", "zeta");
        a.add_bid(Decimal::from_i64(100), Decimal::from_i64(1));
        a.sort();
        let b = OrderBook::new("BTC-USDC", "alpha");
        b.add_bid(Decimal::from_i64(100), Decimal::from_i64(1));
        b.sort();
        agg.add_orderbook(a);
        agg.add_orderbook(b);

        let best = agg.best_bid().unwrap();
        assert_eq!(best.venue, "alpha");
    }

    #[test]
    fn re_adding_a_venue_replaces_its_snapshot() {
        let agg = AggregatedOrderbook::new("BTC-USDC");
        let a = OrderBook::new("BTC-USDC", "lx");
        a.add_bid(Decimal::from_i64(100), Decimal::from_i64(1));
        a.sort();
        agg.add_orderbook(a);

        let a2 = OrderBook::new("BTC-USDC", "lx");
        a2.add_bid(Decimal::from_i64(50), Decimal::from_i64(1));
        a2.sort();
        agg.add_orderbook(a2);

        let bids = agg.aggregated_bids();
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].price, Decimal::from_i64(50));
    }

    #[test]
    fn best_venue_buy_requires_single_venue_fill() {
        let agg = AggregatedOrderbook::new("BTC-USDC");
        let a = OrderBook::new("BTC-USDC", "venueA");
        a.add_ask(Decimal::from_i64(101), Decimal::from_f64(1.0));
        a.sort();
        let b = OrderBook::new("BTC-USDC", "venueB");
        b.add_ask(Decimal::from_i64(100), Decimal::from_f64(0.5));
        b.sort();
        agg.add_orderbook(a);
        agg.add_orderbook(b);

        let (venue, price) = agg.best_venue_buy(Decimal::from_f64(1.0)).unwrap();
        assert_eq!(venue, "venueA");
        assert_eq!(price, Decimal::from_i64(101));
    }

    #[test]
    fn aggregated_bids_length_and_quantity_sum_preserved() {
        let agg = AggregatedOrderbook::new("BTC-USDC");
        let a = OrderBook::new("BTC-USDC", "venueA");
        a.add_bid(Decimal::from_i64(100), Decimal::from_i64(1));
        a.add_bid(Decimal::from_i64(99), Decimal::from_i64(2));
        a.sort();
        let b = OrderBook::new("BTC-USDC", "venueB");
        b.add_bid(Decimal::from_i64(98), Decimal::from_i64(3));
        b.sort();
        agg.add_orderbook(a);
        agg.add_orderbook(b);

        let bids = agg.aggregated_bids();
        assert_eq!(bids.len(), 3);
        let total: Decimal = bids.iter().map(|l| l.quantity).fold(Decimal::zero(), |acc, q| acc + q);
        assert_eq!(total, Decimal::from_i64(6));
    }
}
