//! SurrealDB implementation of [`CheckoutStore`] — the atomic checkout
//! commit.
//!
//! Stock decrements for every order line, the order CREATE, and the
//! pending-payment CREATE execute inside one SurrealDB transaction.
//! Each decrement is conditional (`WHERE stock >= $qty`); a line that
//! fails the condition THROWs, which cancels the whole transaction.
//! There is no partial order and no partial decrement, ever.

use std::fmt::Write as _;

use surrealdb::{Connection, Surreal};
use tracing::debug;
use uuid::Uuid;
use vendora_core::error::{BusinessRule, VendoraError, VendoraResult};
use vendora_core::models::order::{CreateOrder, Order};
use vendora_core::models::payment::Payment;
use vendora_core::repository::CheckoutStore;

use crate::error::{MAX_CONFLICT_RETRIES, is_write_conflict};
use crate::repository::order::{OrderItemRow, fetch_order};
use crate::repository::payment::fetch_payment;

/// Marker embedded in the THROW message of a failed stock condition,
/// parsed back out to name the offending product.
const STOCK_MARKER: &str = "INSUFFICIENT_STOCK:";

/// SurrealDB implementation of the checkout commit.
#[derive(Clone)]
pub struct SurrealCheckoutStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCheckoutStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CheckoutStore for SurrealCheckoutStore<C> {
    async fn commit(
        &self,
        order: CreateOrder,
        payment_provider: &str,
    ) -> VendoraResult<(Order, Payment)> {
        if order.items.is_empty() {
            return Err(VendoraError::Validation {
                message: "order has no items".into(),
            });
        }

        let order_id = Uuid::new_v4();
        let payment_id = Uuid::new_v4();

        // One statement pair per line: a conditional decrement bound to
        // that line's product and quantity, then a THROW if the
        // condition matched nothing. THROW cancels the transaction.
        let mut query = String::from("BEGIN TRANSACTION;\n");
        for (i, _item) in order.items.iter().enumerate() {
            let _ = write!(
                query,
                "LET $upd_{i} = (UPDATE type::record('product', $product_{i}) \
                 SET stock -= $qty_{i}, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id \
                 AND status = 'Active' \
                 AND stock >= $qty_{i} \
                 RETURN AFTER);\n\
                 IF array::len($upd_{i}) == 0 {{ \
                 THROW \"{STOCK_MARKER}\" + $product_{i} }};\n",
            );
        }
        query.push_str(
            "CREATE type::record('order', $order_id) SET \
             tenant_id = $tenant_id, \
             order_number = $order_number, \
             status = 'Pending', \
             customer_id = $customer_id, \
             customer_email = $customer_email, \
             customer_name = $customer_name, \
             shipping_address = $shipping_address, \
             items = $items, \
             subtotal = $subtotal, \
             tax = $tax, \
             shipping = $shipping, \
             total = $total, \
             currency = $currency \
             RETURN NONE;\n",
        );
        query.push_str(
            "CREATE type::record('payment', $payment_id) SET \
             tenant_id = $tenant_id, \
             order_id = $order_id, \
             provider = $provider, \
             amount = $total, \
             currency = $currency, \
             status = 'Pending', \
             transaction_id = NONE, \
             processed_at = NONE \
             RETURN NONE;\n",
        );
        query.push_str("COMMIT TRANSACTION;");

        // Optimistic write conflicts from simultaneous checkouts re-run
        // the whole transaction; the stock conditions are re-evaluated
        // on every attempt.
        let mut attempt = 0;
        loop {
            attempt += 1;
            let items: Vec<OrderItemRow> =
                order.items.iter().map(OrderItemRow::from_item).collect();

            let mut builder = self
                .db
                .query(&query)
                .bind(("tenant_id", order.tenant_id.to_string()))
                .bind(("order_id", order_id.to_string()))
                .bind(("payment_id", payment_id.to_string()))
                .bind(("order_number", order.order_number.clone()))
                .bind(("customer_id", order.customer_id.to_string()))
                .bind(("customer_email", order.customer_email.clone()))
                .bind(("customer_name", order.customer_name.clone()))
                .bind(("shipping_address", order.shipping_address.clone()))
                .bind(("items", items))
                .bind(("subtotal", order.subtotal))
                .bind(("tax", order.tax))
                .bind(("shipping", order.shipping))
                .bind(("total", order.total))
                .bind(("currency", order.currency.clone()))
                .bind(("provider", payment_provider.to_string()));

            for (i, item) in order.items.iter().enumerate() {
                builder = builder
                    .bind((format!("product_{i}"), item.product_id.to_string()))
                    .bind((format!("qty_{i}"), item.qty));
            }

            match builder.await.and_then(|r| r.check()) {
                Ok(_) => break,
                Err(e) if is_write_conflict(&e) && attempt < MAX_CONFLICT_RETRIES => continue,
                Err(e) => return Err(map_commit_error(&e, &order)),
            }
        }

        debug!(
            tenant_id = %order.tenant_id,
            order_number = %order.order_number,
            lines = order.items.len(),
            "checkout committed"
        );

        // The transaction is committed; read both records back through
        // the regular projections.
        let committed = fetch_order(&self.db, order.tenant_id, order_id).await?;
        let payment = fetch_payment(&self.db, order.tenant_id, payment_id).await?;
        Ok((committed, payment))
    }
}

/// Map a cancelled commit to a typed error.
///
/// A THROW carrying the stock marker names the product whose condition
/// failed; anything else is a storage failure.
fn map_commit_error(err: &surrealdb::Error, order: &CreateOrder) -> VendoraError {
    let msg = err.to_string();
    if let Some(pos) = msg.find(STOCK_MARKER) {
        let tail = &msg[pos + STOCK_MARKER.len()..];
        let id_str: String = tail
            .chars()
            .take_while(|c| c.is_ascii_hexdigit() || *c == '-')
            .collect();
        if let Ok(product_id) = Uuid::parse_str(&id_str) {
            let requested = order
                .items
                .iter()
                .find(|i| i.product_id == product_id)
                .map(|i| i.qty)
                .unwrap_or(0);
            return VendoraError::BusinessRule(BusinessRule::InsufficientStock {
                product_id,
                requested,
            });
        }
    }
    VendoraError::Storage(msg)
}
