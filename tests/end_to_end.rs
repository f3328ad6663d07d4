//! Cross-module scenarios exercised only through the public API, the way a
//! downstream application would use this crate.

use std::sync::Arc;

use lx_trading::prelude::*;
use lx_trading::venue::mock::MockAdapter;
use lx_trading::venue::VenueType;

fn client(risk: RiskConfig) -> TradingClient {
    let mut client = TradingClient::new(ClientConfig::default(), risk);
    let adapter = MockAdapter::new("lx", VenueType::Native);
    client.add_venue(Arc::new(adapter));
    client.connect();
    client
}

#[test]
fn place_limit_order_then_cancel_it() {
    let client = client(RiskConfig::default());

    let order = client
        .limit_buy("BTC-USDC", Decimal::from_f64(0.1), Decimal::from_i64(40_000), None)
        .unwrap();
    assert_eq!(order.status, OrderStatus::Open);

    let cancelled = client.cancel_order(&order.order_id, "BTC-USDC", "lx").unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[test]
fn oversized_order_is_rejected_before_any_adapter_call() {
    let client = client(RiskConfig {
        max_order_size: Decimal::from_i64(10),
        ..Default::default()
    });

    let err = client.buy("BTC-USDC", Decimal::from_i64(15), None).unwrap_err();
    assert!(matches!(err, ClientError::Risk(RiskError::OrderSizeExceeded { .. })));
    assert!(client.open_orders(Some("BTC-USDC")).is_empty());
}

#[test]
fn kill_switch_blocks_every_order_until_reset() {
    let client = client(RiskConfig::default());
    client.risk_manager().kill();

    assert!(client.buy("BTC-USDC", Decimal::from_i64(1), None).is_err());

    client.risk_manager().reset();
    assert!(client.buy("BTC-USDC", Decimal::from_i64(1), None).is_ok());
}

#[test]
fn aggregated_book_picks_best_single_venue_fill_across_two_adapters() {
    let mut client = TradingClient::new(ClientConfig::default(), RiskConfig::default());

    let venue_a = MockAdapter::new("venueA", VenueType::Native);
    let book_a = OrderBook::new("BTC-USDC", "venueA");
    book_a.add_ask(Decimal::from_i64(101), Decimal::from_f64(1.0));
    book_a.sort();
    venue_a.set_book(book_a);
    client.add_venue(Arc::new(venue_a));

    let venue_b = MockAdapter::new("venueB", VenueType::Native);
    let book_b = OrderBook::new("BTC-USDC", "venueB");
    book_b.add_ask(Decimal::from_i64(100), Decimal::from_f64(0.5));
    book_b.sort();
    venue_b.set_book(book_b);
    client.add_venue(Arc::new(venue_b));

    client.connect();

    let agg = client.aggregated_orderbook("BTC-USDC");
    let (venue, price) = agg.best_venue_buy(Decimal::from_f64(1.0)).unwrap();
    assert_eq!(venue, "venueA");
    assert_eq!(price, Decimal::from_i64(101));
}
