//! Asset balances, per-venue and aggregated.

use std::collections::HashMap;

use crate::decimal::Decimal;

/// Free and locked quantity of a single asset on a single venue.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

impl Balance {
    /// `free + locked`.
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

/// Balances for one asset summed across every venue that reported it.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AggregatedBalance {
    pub free: Decimal,
    pub locked: Decimal,
    pub per_venue: HashMap<String, Balance>,
}

impl AggregatedBalance {
    /// Fold a new venue's balance into the aggregate, replacing any prior
    /// entry from that same venue.
    pub fn add_venue(&mut self, venue: impl Into<String>, balance: Balance) {
        let venue = venue.into();
        if let Some(prev) = self.per_venue.remove(&venue) {
            self.free = self.free - prev.free;
            self.locked = self.locked - prev.locked;
        }
        self.free = self.free + balance.free;
        self.locked = self.locked + balance.locked;
        self.per_venue.insert(venue, balance);
    }

    /// `free + locked` across every venue.
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_total_sums_free_and_locked() {
        let b = Balance {
            asset: "BTC".into(),
            free: Decimal::from_i64(10),
            locked: Decimal::from_i64(5),
        };
        assert_eq!(b.total(), Decimal::from_i64(15));
    }

    #[test]
    fn aggregated_balance_sums_across_venues() {
        let mut agg = AggregatedBalance::default();
        agg.add_venue(
            "lx",
            Balance {
                asset: "BTC".into(),
                free: Decimal::from_i64(10),
                locked: Decimal::zero(),
            },
        );
        agg.add_venue(
            "ccxt",
            Balance {
                asset: "BTC".into(),
                free: Decimal::from_i64(5),
                locked: Decimal::from_i64(1),
            },
        );
        assert_eq!(agg.total(), Decimal::from_i64(16));
        assert_eq!(agg.per_venue.len(), 2);
    }

    #[test]
    fn re_adding_a_venue_replaces_not_accumulates() {
        let mut agg = AggregatedBalance::default();
        agg.add_venue(
            "lx",
            Balance {
                asset: "BTC".into(),
                free: Decimal::from_i64(10),
                locked: Decimal::zero(),
            },
        );
        agg.add_venue(
            "lx",
            Balance {
                asset: "BTC".into(),
                free: Decimal::from_i64(3),
                locked: Decimal::zero(),
            },
        );
        assert_eq!(agg.total(), Decimal::from_i64(3));
        assert_eq!(agg.per_venue.len(), 1);
    }
}
