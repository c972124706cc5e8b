//! BitMEX adapter
//!
//! Normalizes the venue's REST responses and push batches into the canonical
//! model and exposes them through [`Exchange`]. The network connection itself
//! is a [`BitmexTransport`] supplied by the caller.

pub mod book;
pub mod mapper;
pub mod memory;
pub mod transport;
pub mod types;

pub use memory::MemoryTransport;
pub use transport::{BitmexTransport, PushMessage, SubscribeInfo, Topic};

use async_trait::async_trait;
use chrono::DateTime;
use log::{debug, info, trace, warn};
use std::sync::Arc;
use xchg_core::{
    Direction, OHLCV, Order, OrderBook, OrderType, Position, Price, Quantity, Timestamp, Trade,
};

use crate::capabilities::Capabilities;
use crate::config::ExchangeConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::exchange::{Exchange, OrderBookCallback, OrderCallback, PositionCallback, TradeCallback};
use crate::subscription::{self, Batch, SubscriptionHandle};
use mapper::{ChangeAction, EXEC_CLOSE, PEG_TRAILING_STOP};
use types::{BucketedQuery, NewOrderRequest};

const NAME: &str = "bitmex";

pub struct BitmexAdapter {
    transport: Arc<dyn BitmexTransport>,
    config: ExchangeConfig,
    /// Fixed at construction
    push_enabled: bool,
    symbol: String,
    capabilities: Capabilities,
}

impl BitmexAdapter {
    /// Build an adapter over `transport`, opening the push connection when
    /// `config.websocket` is set
    pub async fn connect(
        config: ExchangeConfig,
        transport: Arc<dyn BitmexTransport>,
    ) -> GatewayResult<Self> {
        config.validate()?;

        let push_enabled = config.websocket;
        if push_enabled {
            transport.start_push().await?;
            info!("Push connection started for {}", config.base_uri());
        }

        let mut capabilities = Capabilities::bitmex();
        if !push_enabled {
            capabilities.watch_trades = false;
            capabilities.watch_order_book = false;
            capabilities.watch_orders = false;
            capabilities.watch_positions = false;
        }

        debug!(
            "BitMEX adapter ready (base_uri={}, push={})",
            config.base_uri(),
            push_enabled
        );

        Ok(Self {
            transport,
            config,
            push_enabled,
            symbol: String::new(),
            capabilities,
        })
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn push_enabled(&self) -> bool {
        self.push_enabled
    }

    fn resolve_symbol<'a>(&'a self, symbol: &'a str) -> &'a str {
        if symbol.is_empty() {
            &self.symbol
        } else {
            symbol
        }
    }

    /// Register `map` on `topic`, wire it to a fresh delivery queue and wait
    /// for the venue to acknowledge the subscription
    async fn subscribe_topic<T, M>(
        &self,
        topic: Topic,
        market: &str,
        callback: Box<dyn FnMut(T) + Send>,
        map: M,
    ) -> GatewayResult<SubscriptionHandle>
    where
        T: Batch,
        M: Fn(PushMessage) -> Option<T> + Send + Sync + 'static,
    {
        if !self.push_enabled {
            return Err(GatewayError::PushDisabled);
        }

        let info = SubscribeInfo::new(topic, market);
        let (delivery, mut handle) =
            subscription::open(info.to_arg(), self.config.push_queue_capacity, callback);

        let handler_id = self.transport.on(
            topic,
            Box::new(move |message| {
                if let Some(batch) = map(message) {
                    delivery.offer(batch);
                }
            }),
        );
        let transport = Arc::clone(&self.transport);
        handle.on_cancel(move || transport.off(handler_id));

        if let Err(e) = self.transport.subscribe(std::slice::from_ref(&info)).await {
            warn!("Subscription to {} failed: {}", info.to_arg(), e);
            handle.cancel();
            return Err(e.into());
        }

        info!("Subscribed to {}", info.to_arg());
        Ok(handle)
    }
}

/// Build the venue order body for a canonical order
fn new_order_request(
    symbol: &str,
    direction: Direction,
    order_type: OrderType,
    price: Price,
    size: Quantity,
) -> NewOrderRequest {
    let trailing = order_type == OrderType::TrailingStopMarket;

    NewOrderRequest {
        symbol: symbol.to_string(),
        side: mapper::from_canonical_direction(direction).to_string(),
        order_qty: size,
        ord_type: mapper::from_canonical_order_type(order_type).to_string(),
        price: order_type.has_limit_price().then_some(price),
        stop_px: (order_type.is_stop() && !trailing).then_some(price),
        exec_inst: direction.is_close().then(|| EXEC_CLOSE.to_string()),
        peg_price_type: trailing.then(|| PEG_TRAILING_STOP.to_string()),
        peg_offset_value: trailing.then_some(price),
        cl_ord_id: Some(uuid::Uuid::new_v4().to_string()),
    }
}

/// Keep the records of `market`; an empty market keeps everything
///
/// Records without a symbol arrived on a channel already scoped by the venue
/// and are kept. Returns `None` when a non-empty batch has nothing for the
/// market.
fn scope_batch<R>(
    records: Vec<R>,
    market: &str,
    symbol_of: impl Fn(&R) -> &str,
) -> Option<Vec<R>> {
    if market.is_empty() || records.is_empty() {
        return Some(records);
    }
    let scoped: Vec<R> = records
        .into_iter()
        .filter(|r| in_scope(symbol_of(r), market))
        .collect();
    (!scoped.is_empty()).then_some(scoped)
}

fn in_scope(symbol: &str, market: &str) -> bool {
    market.is_empty() || symbol.is_empty() || symbol == market
}

fn trace_action(topic: Topic, action: &str, rows: usize) {
    let action = ChangeAction::parse(action);
    trace!("{} batch: {:?} with {} rows", topic, action, rows);
}

#[async_trait]
impl Exchange for BitmexAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn set_symbol(&mut self, symbol: &str) {
        self.symbol = symbol.to_string();
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn get_time(&self) -> GatewayResult<Timestamp> {
        let version = self.transport.get_version().await?;
        DateTime::from_timestamp_millis(version.timestamp).ok_or_else(|| {
            GatewayError::Conversion(format!(
                "server timestamp {} out of range",
                version.timestamp
            ))
        })
    }

    async fn get_order_book(&self, symbol: &str, depth: u32) -> GatewayResult<OrderBook> {
        let symbol = self.resolve_symbol(symbol);
        let snapshot = self.transport.get_order_book(symbol, depth).await?;
        Ok(book::build_snapshot(symbol, &snapshot))
    }

    async fn get_ohlcv(
        &self,
        symbol: &str,
        period: &str,
        start: Timestamp,
        end: Timestamp,
        limit: u32,
    ) -> GatewayResult<Vec<OHLCV>> {
        let query = BucketedQuery {
            bin_size: mapper::normalize_bin_size(period),
            symbol: self.resolve_symbol(symbol).to_string(),
            partial: false,
            count: limit,
            reverse: false,
            start_time: start,
            end_time: end,
        };
        debug!(
            "Fetching {} candles of {} for {}",
            query.count, query.bin_size, query.symbol
        );

        let bins = self.transport.get_bucketed(&query).await?;
        Ok(bins.iter().map(mapper::parse_candle).collect())
    }

    async fn place_order(
        &self,
        symbol: &str,
        direction: Direction,
        order_type: OrderType,
        price: Price,
        size: Quantity,
    ) -> GatewayResult<Order> {
        let request = new_order_request(
            self.resolve_symbol(symbol),
            direction,
            order_type,
            price,
            size,
        );
        debug!(
            "Placing {} {} {} {} @ {}",
            request.side, request.ord_type, request.order_qty, request.symbol, price
        );

        let ack = self.transport.place_order(&request).await?;
        let order = mapper::parse_order(&ack);
        info!(
            "Order {} acknowledged with status {}",
            order.id, order.status
        );
        Ok(order)
    }

    async fn subscribe_trades(
        &self,
        market: &str,
        callback: TradeCallback,
    ) -> GatewayResult<SubscriptionHandle> {
        let scope = market.to_string();
        self.subscribe_topic(Topic::Trade, market, callback, move |message| {
            let PushMessage::Trade { action, data } = message else {
                return None;
            };
            trace_action(Topic::Trade, &action, data.len());
            let data = scope_batch(data, &scope, |t| t.symbol.as_str())?;
            Some(data.iter().map(mapper::parse_trade).collect::<Vec<Trade>>())
        })
        .await
    }

    async fn subscribe_level2_snapshots(
        &self,
        market: &str,
        callback: OrderBookCallback,
    ) -> GatewayResult<SubscriptionHandle> {
        let scope = market.to_string();
        self.subscribe_topic(Topic::OrderBookL2, market, callback, move |message| {
            let PushMessage::OrderBookL2(table) = message else {
                return None;
            };
            if !in_scope(&table.symbol, &scope) {
                return None;
            }
            Some(book::render_l2(&table))
        })
        .await
    }

    async fn subscribe_orders(
        &self,
        market: &str,
        callback: OrderCallback,
    ) -> GatewayResult<SubscriptionHandle> {
        let scope = market.to_string();
        self.subscribe_topic(Topic::Order, market, callback, move |message| {
            let PushMessage::Order { action, data } = message else {
                return None;
            };
            trace_action(Topic::Order, &action, data.len());
            let data = scope_batch(data, &scope, |o| o.symbol.as_str())?;
            Some(data.iter().map(mapper::parse_order).collect::<Vec<Order>>())
        })
        .await
    }

    async fn subscribe_positions(
        &self,
        market: &str,
        callback: PositionCallback,
    ) -> GatewayResult<SubscriptionHandle> {
        let scope = market.to_string();
        self.subscribe_topic(Topic::Position, market, callback, move |message| {
            let PushMessage::Position { action, data } = message else {
                return None;
            };
            trace_action(Topic::Position, &action, data.len());
            let data = scope_batch(data, &scope, |p| p.symbol.as_str())?;
            Some(
                data.iter()
                    .map(mapper::parse_position)
                    .collect::<Vec<Position>>(),
            )
        })
        .await
    }
}
