//! xchg Gateway
//!
//! Normalization layer between a venue connection and trading logic.
//! Provides:
//! - The venue-independent [`Exchange`] trait and its capability descriptor
//! - Venue adapters (BitMEX) mapping codes and records to `xchg_core` types
//! - Push subscriptions with bounded, cancellable delivery queues
//!
//! ## Architecture
//!
//! ```text
//! Venue connection (REST + push)
//!         │ BitmexTransport
//!    ┌────▼─────────┐
//!    │ BitmexAdapter│  mapper / book
//!    └────┬─────────┘
//!         │ Exchange: canonical Order, Trade, Position, OrderBook, OHLCV
//!    ┌────▼────┐
//!    │ Trading │
//!    │  logic  │
//!    └─────────┘
//! ```
//!
//! ## Subscriptions
//!
//! Push batches are converted on the transport's thread and queued; a
//! per-subscription task hands them to the callback in arrival order. A full
//! queue drops the batch instead of blocking the transport.

pub mod adapters;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod exchange;
pub mod subscription;

// Re-export commonly used types
pub use adapters::BitmexAdapter;
pub use capabilities::Capabilities;
pub use config::{ConfigError, ExchangeConfig, Proxy, TransportSettings};
pub use error::{GatewayError, GatewayResult, TransportError};
pub use exchange::{Exchange, OrderBookCallback, OrderCallback, PositionCallback, TradeCallback};
pub use subscription::{SubscriptionHandle, SubscriptionId};
