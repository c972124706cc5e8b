mod direction;
mod ohlcv;
mod order;
mod order_book;
mod order_status;
mod order_type;
mod position;
mod trade;

pub use direction::Direction;
pub use ohlcv::OHLCV;
pub use order::Order;
pub use order_book::{BookLevel, OrderBook};
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use position::{MarginMode, Position};
pub use trade::Trade;
