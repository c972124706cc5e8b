//! Capability descriptor
//!
//! Static map from operation name to support flag. Integrating code checks
//! `supports` before calling an operation instead of waiting for a runtime
//! error.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capabilities {
    pub cancel_all_orders: bool,
    pub cancel_order: bool,
    pub cancel_orders: bool,
    #[serde(rename = "CORS")]
    pub cors: bool,
    pub create_deposit_address: bool,
    pub create_limit_order: bool,
    pub create_market_order: bool,
    pub create_order: bool,
    pub deposit: bool,
    pub edit_order: bool,
    pub fetch_balance: bool,
    pub fetch_bids_asks: bool,
    pub fetch_closed_orders: bool,
    pub fetch_currencies: bool,
    pub fetch_deposit_address: bool,
    pub fetch_deposits: bool,
    pub fetch_funding_fees: bool,
    #[serde(rename = "fetchL2OrderBook")]
    pub fetch_l2_order_book: bool,
    pub fetch_ledger: bool,
    pub fetch_markets: bool,
    pub fetch_my_trades: bool,
    #[serde(rename = "fetchOHLCV")]
    pub fetch_ohlcv: bool,
    pub fetch_open_orders: bool,
    pub fetch_order: bool,
    pub fetch_order_book: bool,
    pub fetch_order_books: bool,
    pub fetch_orders: bool,
    pub fetch_ticker: bool,
    pub fetch_tickers: bool,
    pub fetch_time: bool,
    pub fetch_trades: bool,
    pub fetch_trading_fee: bool,
    pub fetch_trading_fees: bool,
    pub fetch_trading_limits: bool,
    pub fetch_transactions: bool,
    pub fetch_withdrawals: bool,
    pub private_api: bool,
    pub public_api: bool,
    pub watch_trades: bool,
    pub watch_order_book: bool,
    pub watch_orders: bool,
    pub watch_positions: bool,
    pub withdraw: bool,
}

impl Capabilities {
    /// What the BitMEX adapter implements
    pub fn bitmex() -> Self {
        Self {
            create_limit_order: true,
            create_market_order: true,
            create_order: true,
            fetch_l2_order_book: true,
            fetch_ohlcv: true,
            fetch_order_book: true,
            fetch_time: true,
            private_api: true,
            public_api: true,
            watch_trades: true,
            watch_order_book: true,
            watch_orders: true,
            watch_positions: true,
            ..Default::default()
        }
    }

    /// Look up an operation by its camelCase name; unknown names are unsupported
    pub fn supports(&self, operation: &str) -> bool {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map
                .get(operation)
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Names of every supported operation, sorted
    pub fn supported(&self) -> Vec<String> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => {
                let mut names: Vec<String> = map
                    .into_iter()
                    .filter(|(_, v)| v.as_bool().unwrap_or(false))
                    .map(|(k, _)| k)
                    .collect();
                names.sort();
                names
            }
            _ => Vec::new(),
        }
    }
}
