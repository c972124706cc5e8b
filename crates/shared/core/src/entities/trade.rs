use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Direction;
use crate::values::{Price, Quantity, Symbol, Timestamp};

/// Public execution record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub direction: Direction,
    pub price: Price,
    pub amount: Quantity,
    pub timestamp: Timestamp,
    /// Empty when the trade arrives on a channel already scoped to one symbol
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub symbol: Symbol,
}

impl Trade {
    /// Execution time in milliseconds since the Unix epoch
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Returns the notional value of the trade (price * amount)
    pub fn notional(&self) -> Decimal {
        self.price * self.amount
    }
}
