//! Canonical Domain
//!
//! Venue-independent value types every adapter normalizes to and from.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    BookLevel, Direction, MarginMode, OHLCV, Order, OrderBook, OrderStatus, OrderType, Position,
    Trade,
};
pub use values::{Price, Quantity, Symbol, Timestamp};
