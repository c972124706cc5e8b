//! Venue-independent exchange interface
//!
//! Everything crossing this trait is canonical (`xchg_core`); venue codes and
//! wire shapes stay inside the adapter that implements it.

use async_trait::async_trait;
use xchg_core::{
    Direction, OHLCV, Order, OrderBook, OrderType, Position, Price, Quantity, Timestamp, Trade,
};

use crate::capabilities::Capabilities;
use crate::error::GatewayResult;
use crate::subscription::SubscriptionHandle;

/// Receives trade batches as the venue grouped them; batches that arrive
/// while the consumer lags are merged into one call
pub type TradeCallback = Box<dyn FnMut(Vec<Trade>) + Send>;
/// Receives a complete, sorted book per push
pub type OrderBookCallback = Box<dyn FnMut(OrderBook) + Send>;
pub type OrderCallback = Box<dyn FnMut(Vec<Order>) + Send>;
pub type PositionCallback = Box<dyn FnMut(Vec<Position>) + Send>;

#[async_trait]
pub trait Exchange: Send + Sync {
    /// Lowercase venue name
    fn name(&self) -> &str;

    /// Default symbol, used when an operation is called with an empty symbol
    fn symbol(&self) -> &str;

    fn set_symbol(&mut self, symbol: &str);

    fn capabilities(&self) -> &Capabilities;

    /// Venue server clock
    async fn get_time(&self) -> GatewayResult<Timestamp>;

    async fn get_order_book(&self, symbol: &str, depth: u32) -> GatewayResult<OrderBook>;

    /// Candles for `period` between `start` and `end`, at most `limit` of them
    ///
    /// `period` is a bin size such as `1m`, `1h` or `1d`; a bare number is
    /// read as minutes.
    async fn get_ohlcv(
        &self,
        symbol: &str,
        period: &str,
        start: Timestamp,
        end: Timestamp,
        limit: u32,
    ) -> GatewayResult<Vec<OHLCV>>;

    /// Submit an order and return the venue's acknowledgment
    async fn place_order(
        &self,
        symbol: &str,
        direction: Direction,
        order_type: OrderType,
        price: Price,
        size: Quantity,
    ) -> GatewayResult<Order>;

    async fn subscribe_trades(
        &self,
        market: &str,
        callback: TradeCallback,
    ) -> GatewayResult<SubscriptionHandle>;

    async fn subscribe_level2_snapshots(
        &self,
        market: &str,
        callback: OrderBookCallback,
    ) -> GatewayResult<SubscriptionHandle>;

    async fn subscribe_orders(
        &self,
        market: &str,
        callback: OrderCallback,
    ) -> GatewayResult<SubscriptionHandle>;

    async fn subscribe_positions(
        &self,
        market: &str,
        callback: PositionCallback,
    ) -> GatewayResult<SubscriptionHandle>;
}
