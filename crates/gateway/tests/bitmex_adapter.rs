//! Integration test: BitmexAdapter <-> in-memory transport
//!
//! Drives every `Exchange` operation through `MemoryTransport`, pushing
//! venue-shaped batches and checking what reaches the callbacks.

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use xchg_core::{Direction, MarginMode, OrderStatus, OrderType};
use xchg_gateway::adapters::bitmex::types::{
    BitmexOrder, BitmexPosition, BitmexTrade, DepthLevel, L2Row, OrderBookL2, OrderBookSnapshot,
    TradeBin, VersionInfo,
};
use xchg_gateway::adapters::bitmex::{BitmexAdapter, MemoryTransport, PushMessage};
use xchg_gateway::{Exchange, ExchangeConfig, GatewayError, TransportError};

async fn setup(config: ExchangeConfig) -> (Arc<MemoryTransport>, BitmexAdapter) {
    let _ = env_logger::try_init();

    let transport = Arc::new(MemoryTransport::new());
    let adapter = BitmexAdapter::connect(config, transport.clone())
        .await
        .expect("Failed to connect adapter");
    (transport, adapter)
}

async fn push_adapter() -> (Arc<MemoryTransport>, BitmexAdapter) {
    setup(ExchangeConfig::default().with_websocket(true)).await
}

async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("Timed out waiting for callback")
        .expect("Callback channel closed")
}

async fn assert_silent<T>(rx: &mut mpsc::UnboundedReceiver<T>) {
    let res = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(res.is_err(), "Unexpected callback");
}

fn wire_trade(id: &str, symbol: &str, side: &str, price: rust_decimal::Decimal) -> BitmexTrade {
    BitmexTrade {
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        symbol: symbol.to_string(),
        side: side.to_string(),
        size: dec!(100),
        price,
        trd_match_id: id.to_string(),
        tick_direction: None,
    }
}

fn l2_row(id: u64, side: &str, price: rust_decimal::Decimal) -> L2Row {
    L2Row {
        symbol: "XBTUSD".to_string(),
        id,
        side: side.to_string(),
        size: dec!(10),
        price,
    }
}

fn order_update(status: &str, filled: rust_decimal::Decimal) -> PushMessage {
    PushMessage::Order {
        action: "update".to_string(),
        data: vec![BitmexOrder {
            order_id: "o-1".to_string(),
            symbol: "XBTUSD".to_string(),
            side: Some("Buy".to_string()),
            order_qty: Some(dec!(100)),
            cum_qty: Some(filled),
            ord_type: Some("Limit".to_string()),
            ord_status: Some(status.to_string()),
            ..Default::default()
        }],
    }
}

#[tokio::test]
async fn test_push_disabled_rejects_without_transport_calls() {
    let (transport, adapter) = setup(ExchangeConfig::default()).await;

    let res = adapter.subscribe_trades("XBTUSD", Box::new(|_| {})).await;
    assert!(matches!(res, Err(GatewayError::PushDisabled)));
    let res = adapter
        .subscribe_level2_snapshots("XBTUSD", Box::new(|_| {}))
        .await;
    assert!(matches!(res, Err(GatewayError::PushDisabled)));
    let res = adapter.subscribe_orders("XBTUSD", Box::new(|_| {})).await;
    assert!(matches!(res, Err(GatewayError::PushDisabled)));
    let res = adapter.subscribe_positions("XBTUSD", Box::new(|_| {})).await;
    assert!(matches!(res, Err(GatewayError::PushDisabled)));

    assert_eq!(transport.calls(), 0);
    assert_eq!(transport.handler_count(), 0);
    assert!(!transport.push_started());
    assert!(!adapter.capabilities().supports("watchTrades"));
    assert!(adapter.capabilities().supports("fetchOrderBook"));
}

#[tokio::test]
async fn test_connect_starts_push() {
    let (transport, adapter) = push_adapter().await;

    assert!(transport.push_started());
    assert!(adapter.push_enabled());
    assert_eq!(adapter.name(), "bitmex");
    assert!(adapter.capabilities().supports("watchOrderBook"));
    assert!(!adapter.capabilities().supports("withdraw"));
}

#[tokio::test]
async fn test_connect_rejects_bad_proxy() {
    let transport = Arc::new(MemoryTransport::new());
    let res = BitmexAdapter::connect(
        ExchangeConfig::default().with_proxy("ftp://nowhere"),
        transport.clone(),
    )
    .await;

    assert!(matches!(res, Err(GatewayError::Config(_))));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_get_time() {
    let (transport, adapter) = setup(ExchangeConfig::default()).await;
    transport.set_version(VersionInfo {
        name: "BitMEX API".to_string(),
        version: "1.2.0".to_string(),
        timestamp: 1_700_000_000_123,
    });

    let time = adapter.get_time().await.unwrap();
    assert_eq!(time.timestamp_millis(), 1_700_000_000_123);
}

#[tokio::test]
async fn test_transport_errors_pass_through() {
    let (transport, adapter) = setup(ExchangeConfig::default()).await;
    transport.fail_next(TransportError::Api {
        code: 401,
        message: "Invalid API Key.".to_string(),
    });

    let err = adapter.get_time().await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Transport(TransportError::Api { code: 401, .. })
    ));
    assert_eq!(err.to_string(), "API error 401: Invalid API Key.");
}

#[tokio::test]
async fn test_get_order_book_uses_default_symbol() {
    let (transport, mut adapter) = setup(ExchangeConfig::default()).await;
    transport.set_order_book(OrderBookSnapshot {
        timestamp: Utc::now(),
        bids: vec![DepthLevel {
            price: dec!(30000),
            size: dec!(5),
        }],
        asks: vec![DepthLevel {
            price: dec!(30000.5),
            size: dec!(3),
        }],
    });

    adapter.set_symbol("XBTUSD");
    assert_eq!(adapter.symbol(), "XBTUSD");

    let book = adapter.get_order_book("", 25).await.unwrap();
    assert_eq!(book.symbol, "XBTUSD");
    assert_eq!(book.spread(), Some(dec!(0.5)));

    adapter.get_order_book("ETHUSD", 10).await.unwrap();
    assert_eq!(
        transport.book_requests(),
        vec![("XBTUSD".to_string(), 25), ("ETHUSD".to_string(), 10)]
    );
}

#[tokio::test]
async fn test_get_ohlcv_normalizes_period() {
    let (transport, adapter) = setup(ExchangeConfig::default()).await;
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
    transport.set_bins(vec![TradeBin {
        timestamp: start,
        symbol: "XBTUSD".to_string(),
        open: dec!(100),
        high: dec!(110),
        low: dec!(95),
        close: dec!(105),
        trades: 42,
        volume: dec!(1000),
    }]);

    let candles = adapter
        .get_ohlcv("XBTUSD", "5", start, end, 100)
        .await
        .unwrap();
    adapter
        .get_ohlcv("XBTUSD", "1h", start, end, 24)
        .await
        .unwrap();

    assert_eq!(candles.len(), 1);
    assert_eq!(candles[0].high, dec!(110));
    assert_eq!(candles[0].volume, dec!(1000));

    let queries = transport.bucketed_queries();
    assert_eq!(queries[0].bin_size, "5m");
    assert_eq!(queries[0].count, 100);
    assert!(!queries[0].partial);
    assert_eq!(queries[0].start_time, start);
    assert_eq!(queries[0].end_time, end);
    assert_eq!(queries[1].bin_size, "1h");
}

#[tokio::test]
async fn test_place_limit_order() {
    let (transport, adapter) = setup(ExchangeConfig::default()).await;

    let order = adapter
        .place_order(
            "XBTUSD",
            Direction::Sell,
            OrderType::Limit,
            dec!(30000.5),
            dec!(100),
        )
        .await
        .unwrap();

    let sent = transport.placed_orders();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].side, "Sell");
    assert_eq!(sent[0].ord_type, "Limit");
    assert_eq!(sent[0].price, Some(dec!(30000.5)));

    assert_eq!(order.direction, Direction::Sell);
    assert_eq!(order.order_type, OrderType::Limit);
    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.price, dec!(30000.5));
    assert_eq!(order.amount, dec!(100));
    assert_eq!(order.client_order_id, sent[0].cl_ord_id);
}

#[tokio::test]
async fn test_place_order_parses_venue_ack() {
    let (transport, adapter) = setup(ExchangeConfig::default()).await;
    transport.set_order_ack(BitmexOrder {
        order_id: "ack-1".to_string(),
        symbol: "XBTUSD".to_string(),
        side: Some("Buy".to_string()),
        order_qty: Some(dec!(50)),
        stop_px: Some(dec!(31000)),
        ord_type: Some("Stop".to_string()),
        ord_status: Some("New".to_string()),
        triggered: Some("NotTriggered".to_string()),
        exec_inst: Some("LastPrice,ReduceOnly".to_string()),
        ..Default::default()
    });

    let order = adapter
        .place_order(
            "XBTUSD",
            Direction::Buy,
            OrderType::StopMarket,
            dec!(31000),
            dec!(50),
        )
        .await
        .unwrap();

    assert_eq!(order.id, "ack-1");
    assert_eq!(order.order_type, OrderType::StopMarket);
    assert_eq!(order.status, OrderStatus::Untriggered);
    assert_eq!(order.stop_price, dec!(31000));
    assert!(order.reduce_only);
    assert!(!order.post_only);
    assert_eq!(transport.placed_orders()[0].stop_px, Some(dec!(31000)));
}

#[tokio::test]
async fn test_place_trailing_stop() {
    let (transport, adapter) = setup(ExchangeConfig::default()).await;

    let order = adapter
        .place_order(
            "XBTUSD",
            Direction::CloseBuy,
            OrderType::TrailingStopMarket,
            dec!(-25.5),
            dec!(10),
        )
        .await
        .unwrap();

    let sent = &transport.placed_orders()[0];
    assert_eq!(sent.ord_type, "Stop");
    assert_eq!(sent.side, "Sell");
    assert_eq!(sent.exec_inst.as_deref(), Some("Close"));
    assert_eq!(sent.peg_price_type.as_deref(), Some("TrailingStopPeg"));

    assert_eq!(order.order_type, OrderType::TrailingStopMarket);
    assert_eq!(order.price_rate, "-25.5");
    assert!(order.close_position);
}

#[tokio::test]
async fn test_level2_push_is_sorted() {
    let (transport, adapter) = push_adapter().await;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = adapter
        .subscribe_level2_snapshots(
            "XBTUSD",
            Box::new(move |book| {
                let _ = tx.send(book);
            }),
        )
        .await
        .unwrap();
    assert_eq!(handle.topic(), "orderBookL2:XBTUSD");
    assert_eq!(transport.subscriptions()[0].to_arg(), "orderBookL2:XBTUSD");

    transport.push(PushMessage::OrderBookL2(OrderBookL2 {
        symbol: "XBTUSD".to_string(),
        timestamp: Utc::now(),
        rows: vec![
            l2_row(1, "Sell", dec!(101.5)),
            l2_row(2, "Buy", dec!(99)),
            l2_row(3, "Sell", dec!(100.5)),
            l2_row(4, "Buy", dec!(100)),
        ],
    }));

    let book = next(&mut rx).await;
    let bids: Vec<_> = book.bids.iter().map(|l| l.price).collect();
    let asks: Vec<_> = book.asks.iter().map(|l| l.price).collect();
    assert_eq!(bids, vec![dec!(100), dec!(99)]);
    assert_eq!(asks, vec![dec!(100.5), dec!(101.5)]);
}

#[tokio::test]
async fn test_trade_batches_delivered_whole_and_in_order() {
    let (transport, adapter) = push_adapter().await;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _handle = adapter
        .subscribe_trades(
            "XBTUSD",
            Box::new(move |trades| {
                let _ = tx.send(trades);
            }),
        )
        .await
        .unwrap();

    transport.push(PushMessage::Trade {
        action: "partial".to_string(),
        data: vec![
            wire_trade("t1", "XBTUSD", "Buy", dec!(100)),
            wire_trade("t2", "XBTUSD", "Sell", dec!(101)),
            wire_trade("t3", "XBTUSD", "Buy", dec!(102)),
        ],
    });
    transport.push(PushMessage::Trade {
        action: "insert".to_string(),
        data: vec![wire_trade("t4", "XBTUSD", "Sell", dec!(103))],
    });

    let first = next(&mut rx).await;
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].id, "t1");
    assert_eq!(first[1].direction, Direction::Sell);
    assert_eq!(first[2].price, dec!(102));

    let second = next(&mut rx).await;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id, "t4");
    assert_eq!(second[0].direction, Direction::Sell);
}

#[tokio::test]
async fn test_empty_trade_batch_is_delivered() {
    let (transport, adapter) = push_adapter().await;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = adapter
        .subscribe_trades(
            "XBTUSD",
            Box::new(move |trades| {
                let _ = tx.send(trades);
            }),
        )
        .await
        .unwrap();

    transport.push(PushMessage::Trade {
        action: "partial".to_string(),
        data: Vec::new(),
    });

    let trades = next(&mut rx).await;
    assert!(trades.is_empty());
    assert_eq!(handle.delivered(), 1);
}

#[tokio::test]
async fn test_trades_scoped_to_market() {
    let (transport, adapter) = push_adapter().await;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _handle = adapter
        .subscribe_trades(
            "XBTUSD",
            Box::new(move |trades| {
                let _ = tx.send(trades);
            }),
        )
        .await
        .unwrap();

    transport.push(PushMessage::Trade {
        action: "insert".to_string(),
        data: vec![wire_trade("e1", "ETHUSD", "Buy", dec!(3000))],
    });
    assert_silent(&mut rx).await;

    transport.push(PushMessage::Trade {
        action: "insert".to_string(),
        data: vec![
            wire_trade("e2", "ETHUSD", "Buy", dec!(3000)),
            wire_trade("x1", "XBTUSD", "Buy", dec!(30000)),
        ],
    });
    let trades = next(&mut rx).await;
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].symbol, "XBTUSD");
}

#[tokio::test]
async fn test_order_and_position_pushes() {
    let (transport, adapter) = push_adapter().await;
    let (order_tx, mut order_rx) = mpsc::unbounded_channel();
    let (pos_tx, mut pos_rx) = mpsc::unbounded_channel();

    let _orders = adapter
        .subscribe_orders(
            "XBTUSD",
            Box::new(move |orders| {
                let _ = order_tx.send(orders);
            }),
        )
        .await
        .unwrap();
    let _positions = adapter
        .subscribe_positions(
            "XBTUSD",
            Box::new(move |positions| {
                let _ = pos_tx.send(positions);
            }),
        )
        .await
        .unwrap();

    transport.push(PushMessage::Order {
        action: "update".to_string(),
        data: vec![BitmexOrder {
            order_id: "o-1".to_string(),
            symbol: "XBTUSD".to_string(),
            side: Some("Sell".to_string()),
            order_qty: Some(dec!(200)),
            cum_qty: Some(dec!(50)),
            ord_type: Some("Limit".to_string()),
            ord_status: Some("PartiallyFilled".to_string()),
            exec_inst: Some("ParticipateDoNotInitiate".to_string()),
            ..Default::default()
        }],
    });
    transport.push(PushMessage::Position {
        action: "partial".to_string(),
        data: vec![BitmexPosition {
            symbol: "XBTUSD".to_string(),
            current_qty: Some(dec!(-300)),
            cross_margin: Some(false),
            pos_margin: Some(dec!(0.05)),
            leverage: Some(dec!(10)),
            ..Default::default()
        }],
    });

    let orders = next(&mut order_rx).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::PartiallyFilled);
    assert_eq!(orders[0].direction, Direction::Sell);
    assert_eq!(orders[0].remaining_amount(), dec!(150));
    assert!(orders[0].post_only);

    let positions = next(&mut pos_rx).await;
    assert_eq!(positions.len(), 1);
    assert!(positions[0].is_short());
    assert_eq!(positions[0].margin_mode, Some(MarginMode::Isolated));
    assert_eq!(positions[0].isolated_margin, dec!(0.05));
}

#[tokio::test]
async fn test_cancel_stops_delivery() {
    let (transport, adapter) = push_adapter().await;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut handle = adapter
        .subscribe_trades(
            "XBTUSD",
            Box::new(move |trades| {
                let _ = tx.send(trades);
            }),
        )
        .await
        .unwrap();

    transport.push(PushMessage::Trade {
        action: "insert".to_string(),
        data: vec![wire_trade("t1", "XBTUSD", "Buy", dec!(100))],
    });
    next(&mut rx).await;
    assert_eq!(handle.delivered(), 1);

    handle.cancel();
    assert!(!handle.is_active());
    assert_eq!(transport.handler_count(), 0);

    let invoked = transport.push(PushMessage::Trade {
        action: "insert".to_string(),
        data: vec![wire_trade("t2", "XBTUSD", "Buy", dec!(101))],
    });
    assert_eq!(invoked, 0);
    assert_silent(&mut rx).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_consumer_keeps_every_order_update() {
    let (transport, adapter) =
        setup(ExchangeConfig::default().with_websocket(true).with_push_queue_capacity(1)).await;

    let (entered_tx, entered_rx) = std::sync::mpsc::channel::<()>();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = adapter
        .subscribe_orders(
            "XBTUSD",
            Box::new(move |orders| {
                let _ = entered_tx.send(());
                let _ = release_rx.recv_timeout(Duration::from_secs(5));
                let _ = tx.send(orders);
            }),
        )
        .await
        .unwrap();

    // First update occupies the callback
    transport.push(order_update("New", dec!(0)));
    entered_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("Callback never started");

    // One fits in the queue, the rest fold into a pending batch; none block
    let started = std::time::Instant::now();
    transport.push(order_update("PartiallyFilled", dec!(40)));
    transport.push(order_update("PartiallyFilled", dec!(80)));
    transport.push(order_update("Filled", dec!(100)));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(handle.coalesced(), 2);

    for _ in 0..3 {
        let _ = release_tx.send(());
    }

    let mut statuses = Vec::new();
    while statuses.len() < 4 {
        let orders = next(&mut rx).await;
        statuses.extend(orders.into_iter().map(|o| o.status));
    }
    assert_eq!(
        statuses,
        vec![
            OrderStatus::New,
            OrderStatus::PartiallyFilled,
            OrderStatus::PartiallyFilled,
            OrderStatus::Filled,
        ]
    );
    assert_eq!(handle.delivered(), 3);
}

#[tokio::test]
async fn test_order_update_without_symbol_is_delivered() {
    let (transport, adapter) = push_adapter().await;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _handle = adapter
        .subscribe_orders(
            "XBTUSD",
            Box::new(move |orders| {
                let _ = tx.send(orders);
            }),
        )
        .await
        .unwrap();

    transport.push(PushMessage::Order {
        action: "update".to_string(),
        data: vec![BitmexOrder {
            order_id: "o-1".to_string(),
            ord_status: Some("Filled".to_string()),
            ..Default::default()
        }],
    });

    let orders = next(&mut rx).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, "o-1");
    assert_eq!(orders[0].status, OrderStatus::Filled);
    assert!(orders[0].symbol.is_empty());
}

#[tokio::test]
async fn test_failed_subscribe_deregisters_handler() {
    let (transport, adapter) = push_adapter().await;
    transport.fail_subscribe(TransportError::Subscribe("access denied".to_string()));

    let res = adapter.subscribe_orders("XBTUSD", Box::new(|_| {})).await;

    assert!(matches!(
        res,
        Err(GatewayError::Transport(TransportError::Subscribe(_)))
    ));
    assert_eq!(transport.handler_count(), 0);
    assert!(transport.subscriptions().is_empty());
}
