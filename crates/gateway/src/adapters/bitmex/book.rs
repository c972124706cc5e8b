//! Order book aggregation
//!
//! Every produced `OrderBook` is a complete snapshot; nothing is carried
//! over between calls.

use log::trace;
use xchg_core::{BookLevel, OrderBook};

use super::mapper::{SIDE_BUY, SIDE_SELL};
use super::types::{OrderBookL2, OrderBookSnapshot};

/// REST snapshot: the venue already orders both sides
pub fn build_snapshot(symbol: &str, snapshot: &OrderBookSnapshot) -> OrderBook {
    OrderBook {
        symbol: symbol.to_string(),
        timestamp: snapshot.timestamp,
        bids: snapshot
            .bids
            .iter()
            .map(|l| BookLevel::new(l.price, l.size))
            .collect(),
        asks: snapshot
            .asks
            .iter()
            .map(|l| BookLevel::new(l.price, l.size))
            .collect(),
    }
}

/// Push table: partition rows by side, then sort bids descending and asks
/// ascending. Sorts are stable, so equal prices keep arrival order.
pub fn render_l2(table: &OrderBookL2) -> OrderBook {
    let mut book = OrderBook::empty(table.symbol.clone(), table.timestamp);

    for row in &table.rows {
        match row.side.as_str() {
            SIDE_BUY => book.bids.push(BookLevel::new(row.price, row.size)),
            SIDE_SELL => book.asks.push(BookLevel::new(row.price, row.size)),
            other => trace!("Skipping L2 row {} with side {:?}", row.id, other),
        }
    }

    book.bids.sort_by(|a, b| b.price.cmp(&a.price));
    book.asks.sort_by(|a, b| a.price.cmp(&b.price));
    book
}
