use serde::{Deserialize, Serialize};

use crate::values::{Price, Quantity, Symbol, Timestamp};

/// Order book level (price + amount)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub amount: Quantity,
}

impl BookLevel {
    pub fn new(price: Price, amount: Quantity) -> Self {
        Self { price, amount }
    }
}

/// Complete level-2 snapshot at one timestamp
///
/// Bids are sorted descending by price, asks ascending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: Symbol,
    pub timestamp: Timestamp,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl OrderBook {
    /// Create an empty book for a symbol
    pub fn empty(symbol: impl Into<Symbol>, timestamp: Timestamp) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }

    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }

    /// Best ask minus best bid, if both sides are present
    pub fn spread(&self) -> Option<Price> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
