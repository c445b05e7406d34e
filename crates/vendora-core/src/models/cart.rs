//! Cart domain model — ephemeral, session-scoped pre-order line items.
//!
//! A cart holds snapshots only; it never consults live product data.
//! Re-validation against live price and stock is the checkout engine's
//! responsibility.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum quantity per cart line.
pub const MIN_QTY: u32 = 1;
/// Maximum quantity per cart line.
pub const MAX_QTY: u32 = 99;

fn clamp_qty(qty: u32) -> u32 {
    qty.clamp(MIN_QTY, MAX_QTY)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: Uuid,
    /// Product name at the time the line was added.
    pub name_snapshot: String,
    /// Price at the time the line was added. Informational — billing
    /// uses the live price at checkout.
    pub price_snapshot: Decimal,
    pub qty: u32,
}

/// A mutable cart, scoped to exactly one tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    pub tenant_slug: String,
    pub currency: String,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new(tenant_slug: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            tenant_slug: tenant_slug.into(),
            currency: currency.into(),
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line, merging quantities if the product is already present.
    /// Quantity is clamped to `[MIN_QTY, MAX_QTY]`.
    pub fn add(
        &mut self,
        product_id: Uuid,
        name_snapshot: impl Into<String>,
        price_snapshot: Decimal,
        qty: u32,
    ) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.qty = clamp_qty(item.qty.saturating_add(qty));
            item.name_snapshot = name_snapshot.into();
            item.price_snapshot = price_snapshot;
        } else {
            self.items.push(CartItem {
                product_id,
                name_snapshot: name_snapshot.into(),
                price_snapshot,
                qty: clamp_qty(qty),
            });
        }
    }

    /// Set a line's quantity. Zero removes the line; any other value is
    /// clamped to `[MIN_QTY, MAX_QTY]`.
    pub fn update_qty(&mut self, product_id: Uuid, qty: u32) {
        if qty == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.qty = clamp_qty(qty);
        }
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Subtotal of the stored snapshots. Informational only — order
    /// totals are recomputed from live prices at checkout.
    pub fn snapshot_subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| i.price_snapshot * Decimal::from(i.qty))
            .sum()
    }
}
