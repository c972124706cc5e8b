use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Direction, OrderStatus, OrderType};
use crate::values::{Price, Quantity, Symbol, Timestamp};

/// Order as reported by a venue, normalized
///
/// Trailing-stop parameters stay as the venue's decimal strings so values
/// the venue treats as exact are never rounded through a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Venue-assigned order ID
    pub id: String,
    /// Client-assigned order ID, if one was supplied
    pub client_order_id: Option<String>,
    pub symbol: Symbol,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub price: Price,
    pub stop_price: Price,
    /// Requested amount
    pub amount: Quantity,
    pub avg_price: Price,
    pub filled_amount: Quantity,
    pub direction: Direction,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub post_only: bool,
    pub reduce_only: bool,
    pub close_position: bool,
    pub commission: Decimal,
    /// Realized profit/loss
    pub pnl: Decimal,
    pub activate_price: String,
    pub price_rate: String,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            id: String::new(),
            client_order_id: None,
            symbol: Symbol::new(),
            created_at: Timestamp::default(),
            updated_at: Timestamp::default(),
            price: Decimal::ZERO,
            stop_price: Decimal::ZERO,
            amount: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            filled_amount: Decimal::ZERO,
            direction: Direction::Buy,
            order_type: OrderType::Limit,
            status: OrderStatus::Created,
            post_only: false,
            reduce_only: false,
            close_position: false,
            commission: Decimal::ZERO,
            pnl: Decimal::ZERO,
            activate_price: String::new(),
            price_rate: String::new(),
        }
    }
}

impl Order {
    /// Returns remaining amount to be filled
    pub fn remaining_amount(&self) -> Quantity {
        (self.amount - self.filled_amount).max(Decimal::ZERO)
    }

    /// Returns true if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
            || (!self.amount.is_zero() && self.filled_amount >= self.amount)
    }

    /// Checks `filled_amount <= amount` for orders that report fills
    pub fn fill_within_amount(&self) -> bool {
        match self.status {
            OrderStatus::PartiallyFilled | OrderStatus::Filled => {
                self.filled_amount <= self.amount
            }
            _ => true,
        }
    }
}
