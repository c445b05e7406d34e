//! Product domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication status. Only `Active` products are purchasable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProductStatus {
    Active,
    Draft,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub currency: String,
    /// On-hand stock. Never negative; decrements happen only through
    /// the conditional decrement primitive at the persistence layer.
    pub stock: u32,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn purchasable(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub tenant_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub currency: String,
    pub stock: u32,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    /// Absolute stock level. Concurrent-safe adjustments go through
    /// `decrement_if_available`/`restock` instead.
    pub stock: Option<u32>,
    pub status: Option<ProductStatus>,
}
