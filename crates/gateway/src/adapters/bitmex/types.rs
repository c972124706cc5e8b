//! BitMEX wire shapes
//!
//! Venue-native records as the transport hands them over. They are converted
//! to the canonical model by `mapper` and `book` and never leave the adapter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response of the venue root endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Server clock, milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// One aggregated depth level of a REST snapshot
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepthLevel {
    pub price: Decimal,
    pub size: Decimal,
}

/// REST depth snapshot, already split by side and ordered by the venue
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderBookSnapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub bids: Vec<DepthLevel>,
    #[serde(default)]
    pub asks: Vec<DepthLevel>,
}

/// Row of the `orderBookL2` push table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct L2Row {
    pub symbol: String,
    pub id: u64,
    /// "Buy" or "Sell"
    pub side: String,
    #[serde(default)]
    pub size: Decimal,
    #[serde(default)]
    pub price: Decimal,
}

/// Full level-2 table for one symbol as rendered by the push connection
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookL2 {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub rows: Vec<L2Row>,
}

/// `tradeBin*` bucket
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeBin {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    #[serde(default)]
    pub open: Decimal,
    #[serde(default)]
    pub high: Decimal,
    #[serde(default)]
    pub low: Decimal,
    #[serde(default)]
    pub close: Decimal,
    #[serde(default)]
    pub trades: i64,
    #[serde(default)]
    pub volume: Decimal,
}

/// Query for `GET /trade/bucketed`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketedQuery {
    pub bin_size: String,
    pub symbol: String,
    pub partial: bool,
    pub count: u32,
    pub reverse: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitmexTrade {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: String,
    #[serde(default)]
    pub size: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(rename = "trdMatchID")]
    pub trd_match_id: String,
    #[serde(default)]
    pub tick_direction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BitmexOrder {
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(rename = "clOrdID")]
    pub cl_ord_id: Option<String>,
    pub symbol: String,
    pub side: Option<String>,
    pub order_qty: Option<Decimal>,
    pub price: Option<Decimal>,
    pub stop_px: Option<Decimal>,
    pub peg_offset_value: Option<Decimal>,
    pub peg_price_type: Option<String>,
    pub ord_type: Option<String>,
    pub exec_inst: Option<String>,
    pub ord_status: Option<String>,
    pub triggered: Option<String>,
    pub cum_qty: Option<Decimal>,
    pub avg_px: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
    pub transact_time: Option<DateTime<Utc>>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BitmexPosition {
    pub account: i64,
    pub symbol: String,
    pub current_qty: Option<Decimal>,
    pub avg_entry_price: Option<Decimal>,
    pub avg_cost_price: Option<Decimal>,
    pub opening_timestamp: Option<DateTime<Utc>>,
    pub leverage: Option<Decimal>,
    pub cross_margin: Option<bool>,
    pub liquidation_price: Option<Decimal>,
    pub mark_price: Option<Decimal>,
    pub unrealised_pnl: Option<Decimal>,
    pub pos_margin: Option<Decimal>,
    pub risk_limit: Option<Decimal>,
    pub is_open: Option<bool>,
}

/// Body for `POST /order`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    pub symbol: String,
    pub side: String,
    pub order_qty: Decimal,
    pub ord_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_px: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec_inst: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peg_price_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peg_offset_value: Option<Decimal>,
    #[serde(rename = "clOrdID", skip_serializing_if = "Option::is_none")]
    pub cl_ord_id: Option<String>,
}
