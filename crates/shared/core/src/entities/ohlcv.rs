use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Price, Symbol, Timestamp};

/// One candle of a requested period
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub struct OHLCV {
    pub symbol: Symbol,
    pub timestamp: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Decimal,
}
