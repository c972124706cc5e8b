use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Direction;
use crate::values::{Price, Quantity, Symbol, Timestamp};

/// Margin mode of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarginMode {
    /// Cross margin - all positions share the same margin pool
    Cross,
    /// Isolated margin - each position has its own margin
    Isolated,
}

/// Account position in one symbol on one venue
///
/// `size` is signed: positive is long, negative is short, zero is flat.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub open_time: Timestamp,
    pub open_price: Price,
    pub size: Quantity,
    pub avg_price: Price,
    /// Unrealized profit, in venue settlement units
    pub profit: Decimal,
    pub margin_mode: Option<MarginMode>,
    pub auto_add_margin: bool,
    pub isolated_margin: Decimal,
    pub leverage: Decimal,
    pub liquidation_price: Price,
    pub mark_price: Price,
    pub max_notional: Decimal,
    pub position_side: String,
}

impl Position {
    /// Buy for flat or long, Sell for short.
    ///
    /// A flat position also reports Buy, so check `is_open` first.
    pub fn side(&self) -> Direction {
        if self.size < Decimal::ZERO {
            Direction::Sell
        } else {
            Direction::Buy
        }
    }

    pub fn is_open(&self) -> bool {
        !self.size.is_zero()
    }

    pub fn is_long(&self) -> bool {
        self.size > Decimal::ZERO
    }

    pub fn is_short(&self) -> bool {
        self.size < Decimal::ZERO
    }
}
