//! SurrealDB implementation of [`OrderRepository`].
//!
//! `order` is a SurrealQL keyword, so queries reference the table in
//! backtick-escaped form; record addressing goes through
//! `type::record('order', ...)` which takes a plain string.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vendora_core::error::{BusinessRule, VendoraError, VendoraResult};
use vendora_core::models::order::{Order, OrderItem, OrderStatus, UpdateOrder};
use vendora_core::repository::{OrderRepository, PaginatedResult, Pagination};

use crate::error::DbError;

/// One order line as stored.
#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct OrderItemRow {
    pub product_id: String,
    pub name_snapshot: String,
    pub price_snapshot: Decimal,
    pub qty: u32,
    pub line_total: Decimal,
}

impl OrderItemRow {
    pub(crate) fn from_item(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name_snapshot: item.name_snapshot.clone(),
            price_snapshot: item.price_snapshot,
            qty: item.qty,
            line_total: item.line_total,
        }
    }

    fn try_into_item(self) -> Result<OrderItem, DbError> {
        let product_id = Uuid::parse_str(&self.product_id)
            .map_err(|e| DbError::Query(format!("invalid product UUID: {e}")))?;
        Ok(OrderItem {
            product_id,
            name_snapshot: self.name_snapshot,
            price_snapshot: self.price_snapshot,
            qty: self.qty,
            line_total: self.line_total,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
pub(crate) struct OrderRowWithId {
    record_id: String,
    tenant_id: String,
    order_number: String,
    status: String,
    customer_id: String,
    customer_email: String,
    customer_name: String,
    shipping_address: Option<String>,
    items: Vec<OrderItemRow>,
    subtotal: Decimal,
    tax: Decimal,
    shipping: Decimal,
    total: Decimal,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) fn parse_status(s: &str) -> Result<OrderStatus, DbError> {
    match s {
        "Pending" => Ok(OrderStatus::Pending),
        "Confirmed" => Ok(OrderStatus::Confirmed),
        "Processing" => Ok(OrderStatus::Processing),
        "Shipped" => Ok(OrderStatus::Shipped),
        "Delivered" => Ok(OrderStatus::Delivered),
        "Cancelled" => Ok(OrderStatus::Cancelled),
        "Refunded" => Ok(OrderStatus::Refunded),
        other => Err(DbError::Query(format!("unknown order status: {other}"))),
    }
}

pub(crate) fn status_to_string(s: OrderStatus) -> &'static str {
    match s {
        OrderStatus::Pending => "Pending",
        OrderStatus::Confirmed => "Confirmed",
        OrderStatus::Processing => "Processing",
        OrderStatus::Shipped => "Shipped",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Cancelled",
        OrderStatus::Refunded => "Refunded",
    }
}

impl OrderRowWithId {
    pub(crate) fn try_into_order(self) -> Result<Order, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Query(format!("invalid tenant UUID: {e}")))?;
        let customer_id = Uuid::parse_str(&self.customer_id)
            .map_err(|e| DbError::Query(format!("invalid customer UUID: {e}")))?;
        let items = self
            .items
            .into_iter()
            .map(OrderItemRow::try_into_item)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(Order {
            id,
            tenant_id,
            order_number: self.order_number,
            status: parse_status(&self.status)?,
            customer_id,
            customer_email: self.customer_email,
            customer_name: self.customer_name,
            shipping_address: self.shipping_address,
            items,
            subtotal: self.subtotal,
            tax: self.tax,
            shipping: self.shipping,
            total: self.total,
            currency: self.currency,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Fetch one order by record id within a tenant.
///
/// Shared with the checkout commit, which reads the freshly committed
/// order back through the same projection.
pub(crate) async fn fetch_order<C: Connection>(
    db: &Surreal<C>,
    tenant_id: Uuid,
    id: Uuid,
) -> VendoraResult<Order> {
    let id_str = id.to_string();

    let mut result = db
        .query(
            "SELECT meta::id(id) AS record_id, * \
             FROM type::record('order', $id) \
             WHERE tenant_id = $tenant_id",
        )
        .bind(("id", id_str.clone()))
        .bind(("tenant_id", tenant_id.to_string()))
        .await
        .map_err(DbError::from)?;

    let rows: Vec<OrderRowWithId> = result.take(0).map_err(DbError::from)?;
    let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: "order".into(),
        id: id_str,
    })?;

    Ok(row.try_into_order()?)
}

/// SurrealDB implementation of the Order repository.
#[derive(Clone)]
pub struct SurrealOrderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrderRepository for SurrealOrderRepository<C> {
    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> VendoraResult<Order> {
        fetch_order(&self.db, tenant_id, id).await
    }

    async fn get_by_number(&self, tenant_id: Uuid, order_number: &str) -> VendoraResult<Order> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM `order` \
                 WHERE tenant_id = $tenant_id \
                 AND order_number = $order_number",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("order_number", order_number.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "order".into(),
            id: format!("number={order_number}"),
        })?;

        Ok(row.try_into_order()?)
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateOrder) -> VendoraResult<Order> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.shipping_address.is_some() {
            sets.push("shipping_address = $shipping_address");
        }
        sets.push("updated_at = time::now()");

        // Terminal statuses are immutable; the guard turns writes
        // against them into no-ops, distinguished from NotFound below.
        let query = format!(
            "UPDATE type::record('order', $id) SET {} \
             WHERE tenant_id = $tenant_id \
             AND status NOT IN ['Delivered', 'Cancelled', 'Refunded'] \
             RETURN meta::id(id) AS record_id, *",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));

        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(shipping_address) = input.shipping_address {
            builder = builder.bind(("shipping_address", shipping_address));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrderRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(row.try_into_order()?),
            None => {
                // Either absent or already terminal.
                let current = fetch_order(&self.db, tenant_id, id).await?;
                Err(VendoraError::BusinessRule(BusinessRule::ImmutableOrder {
                    status: current.status,
                }))
            }
        }
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Order>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM `order` \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM `order` \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_order())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
