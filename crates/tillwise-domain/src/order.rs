//! Order aggregate and the role-independent lifecycle graph.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{OrderId, ShopId};

/// Lifecycle status of an order.
///
/// Wire format: snake_case string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Accepted,
    InPreparation,
    Ready,
    Served,
    PaymentRequested,
    Paid,
    Closed,
    Cancelled,
    Void,
    Refunded,
    Pending,
    Completed,
}

use OrderStatus::*;

impl OrderStatus {
    pub const ALL: [OrderStatus; 13] = [
        New,
        Accepted,
        InPreparation,
        Ready,
        Served,
        PaymentRequested,
        Paid,
        Closed,
        Cancelled,
        Void,
        Refunded,
        Pending,
        Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            New => "new",
            Accepted => "accepted",
            InPreparation => "in_preparation",
            Ready => "ready",
            Served => "served",
            PaymentRequested => "payment_requested",
            Paid => "paid",
            Closed => "closed",
            Cancelled => "cancelled",
            Void => "void",
            Refunded => "refunded",
            Pending => "pending",
            Completed => "completed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// Statuses with no outgoing edges at all.
    pub fn is_terminal(self) -> bool {
        matches!(self, Closed | Cancelled | Void | Refunded | Completed)
    }

    /// Legal next statuses in the global graph, regardless of who asks.
    ///
    /// `Paid → Closed` is only taken by the shop closing operation.
    /// `Pending` heads the two-state quick-sale sub-machine.
    pub fn next_statuses(self) -> &'static [OrderStatus] {
        match self {
            New => &[Accepted, Void],
            Accepted => &[InPreparation, Void],
            InPreparation => &[Ready, Void],
            Ready => &[Served, Void],
            Served => &[PaymentRequested, Void],
            PaymentRequested => &[Paid, Void],
            Paid => &[Closed],
            Pending => &[Completed, Cancelled],
            Closed | Cancelled | Void | Refunded | Completed => &[],
        }
    }

    pub fn can_reach(self, target: OrderStatus) -> bool {
        self.next_statuses().contains(&target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

/// One line of an order. Opaque to the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Unit price in minor currency units.
    pub unit_price: i64,
}

/// Order aggregate. The engine only ever reasons about `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub shop_id: ShopId,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    /// Total in minor currency units.
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Copy of this order with only the status replaced.
    pub fn with_status(&self, status: OrderStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}
