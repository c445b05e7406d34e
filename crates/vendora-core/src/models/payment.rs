//! Payment domain model — one record per attempt to settle an order.
//!
//! A payment may be retried; each retry is a new record. At most one
//! `Completed` payment is valid per order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub order_id: Uuid,
    pub provider: String,
    /// Must equal the order's total within a 0.01 currency-unit
    /// tolerance; verified before any provider is contacted.
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayment {
    pub tenant_id: Uuid,
    pub order_id: Uuid,
    pub provider: String,
    pub amount: Decimal,
    pub currency: String,
}
