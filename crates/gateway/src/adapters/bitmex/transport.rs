//! BitMEX transport port
//!
//! The venue connection (signing, websocket framing, reconnects) lives
//! outside this crate. The adapter only needs the calls below.

use async_trait::async_trait;
use std::fmt;

use super::types::{
    BitmexOrder, BitmexPosition, BitmexTrade, BucketedQuery, NewOrderRequest, OrderBookL2,
    OrderBookSnapshot, TradeBin, VersionInfo,
};
use crate::error::TransportError;

/// Push-channel topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Trade,
    OrderBookL2,
    Order,
    Position,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Trade => "trade",
            Topic::OrderBookL2 => "orderBookL2",
            Topic::Order => "order",
            Topic::Position => "position",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One push-channel message, tagged by wire shape
///
/// `action` is the venue's change tag (`partial`, `insert`, `update`,
/// `delete`).
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    Trade {
        action: String,
        data: Vec<BitmexTrade>,
    },
    OrderBookL2(OrderBookL2),
    Order {
        action: String,
        data: Vec<BitmexOrder>,
    },
    Position {
        action: String,
        data: Vec<BitmexPosition>,
    },
}

impl PushMessage {
    pub fn topic(&self) -> Topic {
        match self {
            PushMessage::Trade { .. } => Topic::Trade,
            PushMessage::OrderBookL2(_) => Topic::OrderBookL2,
            PushMessage::Order { .. } => Topic::Order,
            PushMessage::Position { .. } => Topic::Position,
        }
    }
}

/// Subscription request: topic plus its filter, usually a symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeInfo {
    pub op: Topic,
    pub param: String,
}

impl SubscribeInfo {
    pub fn new(op: Topic, param: impl Into<String>) -> Self {
        Self {
            op,
            param: param.into(),
        }
    }

    /// Wire form, e.g. `trade:XBTUSD`
    pub fn to_arg(&self) -> String {
        if self.param.is_empty() {
            self.op.as_str().to_string()
        } else {
            format!("{}:{}", self.op, self.param)
        }
    }
}

/// Identifies a registered push handler
pub type HandlerId = u64;

/// Push handler, called on whatever thread the transport dispatches from
pub type PushHandler = Box<dyn Fn(PushMessage) + Send + Sync>;

/// Venue connection consumed by `BitmexAdapter`
///
/// Implementations must be safe to call concurrently with their own push
/// dispatch.
#[async_trait]
pub trait BitmexTransport: Send + Sync {
    /// `GET /` - server name, version and clock
    async fn get_version(&self) -> Result<VersionInfo, TransportError>;

    /// `GET /orderBook/L2` aggregated into a depth snapshot
    async fn get_order_book(
        &self,
        symbol: &str,
        depth: u32,
    ) -> Result<OrderBookSnapshot, TransportError>;

    /// `GET /trade/bucketed`
    async fn get_bucketed(&self, query: &BucketedQuery) -> Result<Vec<TradeBin>, TransportError>;

    /// `POST /order`, returning the venue's acknowledgment
    async fn place_order(&self, request: &NewOrderRequest) -> Result<BitmexOrder, TransportError>;

    /// Open the push connection
    async fn start_push(&self) -> Result<(), TransportError>;

    /// Register a handler for every message on `topic`
    fn on(&self, topic: Topic, handler: PushHandler) -> HandlerId;

    /// Remove a handler; unknown ids are ignored
    fn off(&self, id: HandlerId);

    /// Subscribe on the push connection; returns once the venue acknowledges
    async fn subscribe(&self, subscriptions: &[SubscribeInfo]) -> Result<(), TransportError>;
}
