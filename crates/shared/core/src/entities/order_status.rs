use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Not yet acknowledged by the venue, or an unrecognized venue status
    #[default]
    Created,
    /// Order was rejected by the venue
    Rejected,
    /// Order is resting on the book
    New,
    /// Order has been partially filled
    PartiallyFilled,
    /// Order has been completely filled
    Filled,
    /// Cancel requested, not yet confirmed
    CancelPending,
    /// Order has been canceled
    Canceled,
    /// Stop order waiting for its trigger
    Untriggered,
    /// Stop order whose trigger has fired
    Triggered,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Canceled | OrderStatus::Rejected
        )
    }

    /// Returns true if the order can still trade
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::New
                | OrderStatus::PartiallyFilled
                | OrderStatus::Untriggered
                | OrderStatus::Triggered
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Created => "Created",
            OrderStatus::Rejected => "Rejected",
            OrderStatus::New => "New",
            OrderStatus::PartiallyFilled => "PartiallyFilled",
            OrderStatus::Filled => "Filled",
            OrderStatus::CancelPending => "CancelPending",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Untriggered => "Untriggered",
            OrderStatus::Triggered => "Triggered",
        };
        f.write_str(s)
    }
}
