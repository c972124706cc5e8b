use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading direction
///
/// Venues that only know buy/sell use the first two variants. The close
/// variants carry position-closing intent: `CloseBuy` closes a long,
/// `CloseSell` closes a short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Buy,
    Sell,
    CloseBuy,
    CloseSell,
}

impl Direction {
    /// Returns true for the position-closing variants
    pub fn is_close(&self) -> bool {
        matches!(self, Direction::CloseBuy | Direction::CloseSell)
    }

    /// Side of the book an order with this direction executes on
    pub fn order_side(&self) -> Self {
        match self {
            Direction::Buy | Direction::CloseSell => Direction::Buy,
            Direction::Sell | Direction::CloseBuy => Direction::Sell,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Buy => "Buy",
            Direction::Sell => "Sell",
            Direction::CloseBuy => "CloseBuy",
            Direction::CloseSell => "CloseSell",
        };
        f.write_str(s)
    }
}
