use serde::{Deserialize, Serialize};
use std::fmt;

/// Order types understood by the canonical model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Execute at current market price
    Market,
    /// Execute at specified price or better
    Limit,
    /// Market order triggered when price reaches stop price
    StopMarket,
    /// Limit order triggered when price reaches stop price
    StopLimit,
    /// Stop that follows the market by a fixed offset
    TrailingStopMarket,
}

impl OrderType {
    /// Returns true if the order waits on a trigger price
    pub fn is_stop(&self) -> bool {
        matches!(
            self,
            OrderType::StopMarket | OrderType::StopLimit | OrderType::TrailingStopMarket
        )
    }

    /// Returns true if the order carries a limit price
    pub fn has_limit_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderType::Market => "Market",
            OrderType::Limit => "Limit",
            OrderType::StopMarket => "StopMarket",
            OrderType::StopLimit => "StopLimit",
            OrderType::TrailingStopMarket => "TrailingStopMarket",
        };
        f.write_str(s)
    }
}
