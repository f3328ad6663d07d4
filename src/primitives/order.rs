//! Order requests and the order records that venues return.

use crate::decimal::Decimal;

/// Which side of the book an order or level sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// `1` for `Buy`, `-1` for `Sell`. Used to sign position deltas.
    pub fn sign(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

/// The order type requested of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    PostOnly,
    Ioc,
    Fok,
}

/// Time-in-force instruction for a resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TimeInForce {
    Gtc,
    Ioc,
    Fok,
    PostOnly,
}

/// Lifecycle status of a placed [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OrderStatus {
    New,
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
    Expired,
}

/// A fee charged against a fill, denominated in some asset.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeeEntry {
    pub asset: String,
    pub amount: Decimal,
}

/// A side-effect-free order request, built via [`OrderRequest::market`] or
/// [`OrderRequest::limit`] and then refined with the builder setters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    pub venue: Option<String>,
    pub client_order_id: Option<String>,
    pub post_only: bool,
}

impl OrderRequest {
    /// An immediate-or-cancel market order.
    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        OrderRequest {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            time_in_force: TimeInForce::Ioc,
            venue: None,
            client_order_id: None,
            post_only: false,
        }
    }

    /// A good-till-cancelled limit order.
    pub fn limit(symbol: impl Into<String>, side: Side, quantity: Decimal, price: Decimal) -> Self {
        OrderRequest {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            time_in_force: TimeInForce::Gtc,
            venue: None,
            client_order_id: None,
            post_only: false,
        }
    }

    /// Attach an explicit target venue.
    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    /// Attach a caller-supplied client order id.
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    /// Mark the request post-only; this also forces the time-in-force to
    /// [`TimeInForce::PostOnly`].
    pub fn post_only(mut self) -> Self {
        self.post_only = true;
        self.time_in_force = TimeInForce::PostOnly;
        self
    }
}

/// A venue-acknowledged order: the originating request plus fill state.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Order {
    pub request: OrderRequest,
    pub order_id: String,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub average_price: Option<Decimal>,
    pub fees: Vec<FeeEntry>,
    pub venue: String,
}

impl Order {
    /// A freshly-accepted order with nothing filled yet.
    pub fn new(request: OrderRequest, order_id: impl Into<String>, venue: impl Into<String>) -> Self {
        let quantity = request.quantity;
        Order {
            request,
            order_id: order_id.into(),
            status: OrderStatus::New,
            filled_quantity: Decimal::zero(),
            remaining_quantity: quantity,
            average_price: None,
            fees: Vec::new(),
            venue: venue.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_is_ioc() {
        let req = OrderRequest::market("BTC-USDC", Side::Buy, Decimal::from_i64(1));
        assert_eq!(req.order_type, OrderType::Market);
        assert_eq!(req.time_in_force, TimeInForce::Ioc);
        assert!(req.price.is_none());
    }

    #[test]
    fn limit_is_gtc() {
        let req = OrderRequest::limit(
            "BTC-USDC",
            Side::Sell,
            Decimal::from_i64(1),
            Decimal::from_i64(40000),
        );
        assert_eq!(req.order_type, OrderType::Limit);
        assert_eq!(req.time_in_force, TimeInForce::Gtc);
        assert_eq!(req.price, Some(Decimal::from_i64(40000)));
    }

    #[test]
    fn post_only_overrides_time_in_force() {
        let req = OrderRequest::limit("BTC-USDC", Side::Buy, Decimal::from_i64(1), Decimal::from_i64(1))
            .post_only();
        assert!(req.post_only);
        assert_eq!(req.time_in_force, TimeInForce::PostOnly);
    }

    #[test]
    fn builders_are_side_effect_free_values() {
        let base = OrderRequest::limit("BTC-USDC", Side::Buy, Decimal::from_i64(1), Decimal::from_i64(1));
        let with_venue = base.clone().with_venue("lx");
        assert_ne!(base, with_venue);
        assert!(base.venue.is_none());
        assert_eq!(with_venue.venue.as_deref(), Some("lx"));
    }

    #[test]
    fn order_invariant_filled_plus_remaining() {
        let req = OrderRequest::limit("BTC-USDC", Side::Buy, Decimal::from_i64(2), Decimal::from_i64(1));
        let order = Order::new(req, "o1", "lx");
        assert_eq!(
            order.filled_quantity + order.remaining_quantity,
            order.request.quantity
        );
    }
}
