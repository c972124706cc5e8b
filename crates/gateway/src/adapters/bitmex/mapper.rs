//! BitMEX type mapper
//!
//! Pure, total conversions between BitMEX codes and the canonical model.
//! Unrecognized codes resolve to the named `DEFAULT_*` values instead of
//! failing. Integrators who need strict behavior can compare against the
//! defaults.

use log::debug;
use rust_decimal::Decimal;
use xchg_core::{Direction, MarginMode, OHLCV, Order, OrderStatus, OrderType, Position, Trade};

use super::types::{BitmexOrder, BitmexPosition, BitmexTrade, TradeBin};

pub const SIDE_BUY: &str = "Buy";
pub const SIDE_SELL: &str = "Sell";

pub const ORD_TYPE_MARKET: &str = "Market";
pub const ORD_TYPE_LIMIT: &str = "Limit";
pub const ORD_TYPE_STOP: &str = "Stop";
pub const ORD_TYPE_STOP_LIMIT: &str = "StopLimit";

pub const OS_NEW: &str = "New";
pub const OS_PARTIALLY_FILLED: &str = "PartiallyFilled";
pub const OS_FILLED: &str = "Filled";
pub const OS_CANCELED: &str = "Canceled";
pub const OS_REJECTED: &str = "Rejected";
pub const OS_PENDING_CANCEL: &str = "PendingCancel";

pub const EXEC_POST_ONLY: &str = "ParticipateDoNotInitiate";
pub const EXEC_REDUCE_ONLY: &str = "ReduceOnly";
pub const EXEC_CLOSE: &str = "Close";

pub const PEG_TRAILING_STOP: &str = "TrailingStopPeg";

pub const TRIGGER_NOT_TRIGGERED: &str = "NotTriggered";
pub const TRIGGER_FIRED: &str = "StopOrderTriggered";

/// Fallback for unrecognized side codes
pub const DEFAULT_DIRECTION: Direction = Direction::Buy;
/// Fallback for unrecognized order type codes
pub const DEFAULT_ORDER_TYPE: OrderType = OrderType::Limit;
/// Fallback for unrecognized order status codes
pub const DEFAULT_ORDER_STATUS: OrderStatus = OrderStatus::Created;

/// Change tag attached to every push batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Partial,
    Insert,
    Update,
    Delete,
    Other,
}

impl ChangeAction {
    pub fn parse(action: &str) -> Self {
        match action {
            "partial" => ChangeAction::Partial,
            "insert" => ChangeAction::Insert,
            "update" => ChangeAction::Update,
            "delete" => ChangeAction::Delete,
            _ => ChangeAction::Other,
        }
    }
}

/// Execution instruction flags carried in `execInst`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecFlags {
    pub post_only: bool,
    pub reduce_only: bool,
    pub close_position: bool,
}

pub fn to_canonical_direction(side: &str) -> Direction {
    match side {
        SIDE_BUY => Direction::Buy,
        SIDE_SELL => Direction::Sell,
        other => {
            debug!("Unrecognized side {:?}, using {}", other, DEFAULT_DIRECTION);
            DEFAULT_DIRECTION
        }
    }
}

pub fn from_canonical_direction(direction: Direction) -> &'static str {
    match direction.order_side() {
        Direction::Sell => SIDE_SELL,
        _ => SIDE_BUY,
    }
}

pub fn to_canonical_order_type(ord_type: &str) -> OrderType {
    match ord_type {
        ORD_TYPE_MARKET => OrderType::Market,
        ORD_TYPE_LIMIT => OrderType::Limit,
        ORD_TYPE_STOP => OrderType::StopMarket,
        ORD_TYPE_STOP_LIMIT => OrderType::StopLimit,
        other => {
            debug!(
                "Unrecognized order type {:?}, using {}",
                other, DEFAULT_ORDER_TYPE
            );
            DEFAULT_ORDER_TYPE
        }
    }
}

/// Trailing stops are pegged `Stop` orders on this venue
pub fn from_canonical_order_type(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => ORD_TYPE_MARKET,
        OrderType::Limit => ORD_TYPE_LIMIT,
        OrderType::StopMarket | OrderType::TrailingStopMarket => ORD_TYPE_STOP,
        OrderType::StopLimit => ORD_TYPE_STOP_LIMIT,
    }
}

pub fn to_canonical_order_status(ord_status: &str) -> OrderStatus {
    match ord_status {
        OS_NEW => OrderStatus::New,
        OS_PARTIALLY_FILLED => OrderStatus::PartiallyFilled,
        OS_FILLED => OrderStatus::Filled,
        OS_CANCELED => OrderStatus::Canceled,
        OS_REJECTED => OrderStatus::Rejected,
        OS_PENDING_CANCEL => OrderStatus::CancelPending,
        other => {
            debug!(
                "Unrecognized order status {:?}, using {}",
                other, DEFAULT_ORDER_STATUS
            );
            DEFAULT_ORDER_STATUS
        }
    }
}

/// Resting stop orders report `New`; the `triggered` field tells whether
/// the trigger already fired.
pub fn refine_trigger_status(
    status: OrderStatus,
    order_type: OrderType,
    triggered: &str,
) -> OrderStatus {
    if status != OrderStatus::New || !order_type.is_stop() {
        return status;
    }
    match triggered {
        TRIGGER_NOT_TRIGGERED => OrderStatus::Untriggered,
        TRIGGER_FIRED => OrderStatus::Triggered,
        _ => status,
    }
}

/// A flag is set iff its marker appears in the instruction string
pub fn parse_exec_inst(exec_inst: &str) -> ExecFlags {
    ExecFlags {
        post_only: exec_inst.contains(EXEC_POST_ONLY),
        reduce_only: exec_inst.contains(EXEC_REDUCE_ONLY),
        close_position: exec_inst.contains(EXEC_CLOSE),
    }
}

pub fn to_canonical_margin_mode(cross_margin: bool) -> MarginMode {
    if cross_margin {
        MarginMode::Cross
    } else {
        MarginMode::Isolated
    }
}

/// Pass unit-suffixed periods through; bare numbers are minutes
///
/// Only `m`, `h` and `d` are recognized units. An empty period is returned
/// empty so the venue rejects it; any other suffix also gets `m` appended
/// (`"1w"` becomes `"1wm"`) and is likewise left for the venue to reject.
pub fn normalize_bin_size(period: &str) -> String {
    let period = period.trim();
    if period.is_empty() || period.ends_with(['m', 'h', 'd']) {
        period.to_string()
    } else {
        format!("{}m", period)
    }
}

pub fn parse_order(order: &BitmexOrder) -> Order {
    let order_type = match (order.ord_type.as_deref(), order.peg_price_type.as_deref()) {
        (Some(ORD_TYPE_STOP), Some(PEG_TRAILING_STOP)) => OrderType::TrailingStopMarket,
        (ord_type, _) => to_canonical_order_type(ord_type.unwrap_or_default()),
    };

    let status = refine_trigger_status(
        to_canonical_order_status(order.ord_status.as_deref().unwrap_or_default()),
        order_type,
        order.triggered.as_deref().unwrap_or_default(),
    );

    let flags = parse_exec_inst(order.exec_inst.as_deref().unwrap_or_default());
    let created_at = order.transact_time.or(order.timestamp).unwrap_or_default();
    let stop_price = order.stop_px.unwrap_or(Decimal::ZERO);

    let (activate_price, price_rate) = if order_type == OrderType::TrailingStopMarket {
        (
            order.stop_px.map(|p| p.to_string()).unwrap_or_default(),
            order
                .peg_offset_value
                .map(|p| p.to_string())
                .unwrap_or_default(),
        )
    } else {
        (String::new(), String::new())
    };

    Order {
        id: order.order_id.clone(),
        client_order_id: order.cl_ord_id.clone().filter(|id| !id.is_empty()),
        symbol: order.symbol.clone(),
        created_at,
        updated_at: order.timestamp.unwrap_or(created_at),
        price: order.price.unwrap_or(Decimal::ZERO),
        stop_price,
        amount: order.order_qty.unwrap_or(Decimal::ZERO),
        avg_price: order.avg_px.unwrap_or(Decimal::ZERO),
        filled_amount: order.cum_qty.unwrap_or(Decimal::ZERO),
        direction: to_canonical_direction(order.side.as_deref().unwrap_or_default()),
        order_type,
        status,
        post_only: flags.post_only,
        reduce_only: flags.reduce_only,
        close_position: flags.close_position,
        commission: Decimal::ZERO,
        pnl: Decimal::ZERO,
        activate_price,
        price_rate,
    }
}

pub fn parse_trade(trade: &BitmexTrade) -> Trade {
    Trade {
        id: trade.trd_match_id.clone(),
        direction: to_canonical_direction(&trade.side),
        price: trade.price,
        amount: trade.size,
        timestamp: trade.timestamp,
        symbol: trade.symbol.clone(),
    }
}

pub fn parse_position(position: &BitmexPosition) -> Position {
    let margin_mode = position.cross_margin.map(to_canonical_margin_mode);
    let isolated_margin = match margin_mode {
        Some(MarginMode::Isolated) => position.pos_margin.unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };

    Position {
        symbol: position.symbol.clone(),
        open_time: position.opening_timestamp.unwrap_or_default(),
        open_price: position.avg_entry_price.unwrap_or(Decimal::ZERO),
        size: position.current_qty.unwrap_or(Decimal::ZERO),
        avg_price: position.avg_cost_price.unwrap_or(Decimal::ZERO),
        profit: position.unrealised_pnl.unwrap_or(Decimal::ZERO),
        margin_mode,
        auto_add_margin: false,
        isolated_margin,
        leverage: position.leverage.unwrap_or(Decimal::ZERO),
        liquidation_price: position.liquidation_price.unwrap_or(Decimal::ZERO),
        mark_price: position.mark_price.unwrap_or(Decimal::ZERO),
        max_notional: position.risk_limit.unwrap_or(Decimal::ZERO),
        // One-way mode only
        position_side: "BOTH".to_string(),
    }
}

pub fn parse_candle(bin: &TradeBin) -> OHLCV {
    OHLCV {
        symbol: bin.symbol.clone(),
        timestamp: bin.timestamp,
        open: bin.open,
        high: bin.high,
        low: bin.low,
        close: bin.close,
        volume: bin.volume,
    }
}
