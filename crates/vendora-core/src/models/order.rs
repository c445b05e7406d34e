//! Order domain model and status state machine.
//!
//! Orders are immutable-snapshot records of a committed purchase: item
//! prices are frozen at creation time and never recomputed from live
//! product data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle status.
///
/// Forward chain `Pending -> Confirmed -> Processing -> Shipped ->
/// Delivered`, with `Cancelled` and `Refunded` as side transitions.
/// `Delivered`, `Cancelled`, and `Refunded` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            Pending => matches!(next, Confirmed | Cancelled),
            Confirmed => matches!(next, Processing | Cancelled | Refunded),
            Processing => matches!(next, Shipped | Cancelled | Refunded),
            Shipped => matches!(next, Delivered | Refunded),
            Delivered | Cancelled | Refunded => false,
        }
    }
}

/// One order line. Snapshots are fixed at order creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name_snapshot: String,
    /// The price actually billed (live price at checkout time).
    pub price_snapshot: Decimal,
    pub qty: u32,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Unique human-facing reference, generated at creation.
    pub order_number: String,
    pub status: OrderStatus,
    pub customer_id: Uuid,
    pub customer_email: String,
    pub customer_name: String,
    pub shipping_address: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create an order. Orders are only ever created by
/// the checkout commit, in `Pending` status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub tenant_id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub customer_email: String,
    pub customer_name: String,
    pub shipping_address: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub currency: String,
}

/// Mutable order fields. Status patches must be legal transitions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
}
