//! SurrealDB implementation of [`ProductRepository`].
//!
//! Stock adjustments are conditional writes at the storage layer.
//! There is deliberately no code path that reads stock, compares it in
//! the application tier, and writes it back — that pattern oversells
//! under concurrency.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vendora_core::error::VendoraResult;
use vendora_core::models::product::{
    CreateProduct, Product, ProductStatus, UpdateProduct,
};
use vendora_core::repository::{PaginatedResult, Pagination, ProductRepository};

use crate::error::{DbError, MAX_CONFLICT_RETRIES, is_write_conflict};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ProductRow {
    tenant_id: String,
    name: String,
    description: String,
    price: Decimal,
    currency: String,
    stock: u32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ProductRowWithId {
    record_id: String,
    tenant_id: String,
    name: String,
    description: String,
    price: Decimal,
    currency: String,
    stock: u32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) fn parse_status(s: &str) -> Result<ProductStatus, DbError> {
    match s {
        "Active" => Ok(ProductStatus::Active),
        "Draft" => Ok(ProductStatus::Draft),
        "Inactive" => Ok(ProductStatus::Inactive),
        other => Err(DbError::Query(format!("unknown product status: {other}"))),
    }
}

fn status_to_string(s: ProductStatus) -> &'static str {
    match s {
        ProductStatus::Active => "Active",
        ProductStatus::Draft => "Draft",
        ProductStatus::Inactive => "Inactive",
    }
}

impl ProductRow {
    fn into_product(self, id: Uuid) -> Result<Product, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Query(format!("invalid tenant UUID: {e}")))?;
        Ok(Product {
            id,
            tenant_id,
            name: self.name,
            description: self.description,
            price: self.price,
            currency: self.currency,
            stock: self.stock,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ProductRowWithId {
    fn try_into_product(self) -> Result<Product, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Query(format!("invalid tenant UUID: {e}")))?;
        Ok(Product {
            id,
            tenant_id,
            name: self.name,
            description: self.description,
            price: self.price,
            currency: self.currency,
            stock: self.stock,
            status: parse_status(&self.status)?,
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

/// SurrealDB implementation of the Product repository.
#[derive(Clone)]
pub struct SurrealProductRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProductRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_where(
        &self,
        tenant_id: Uuid,
        status: Option<ProductStatus>,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Product>> {
        let tenant_id_str = tenant_id.to_string();
        let status_clause = if status.is_some() {
            " AND status = $status"
        } else {
            ""
        };

        let count_query = format!(
            "SELECT count() AS total FROM product \
             WHERE tenant_id = $tenant_id{status_clause} GROUP ALL"
        );
        let mut count_builder = self
            .db
            .query(&count_query)
            .bind(("tenant_id", tenant_id_str.clone()));
        if let Some(status) = status {
            count_builder = count_builder.bind(("status", status_to_string(status).to_string()));
        }
        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let page_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM product \
             WHERE tenant_id = $tenant_id{status_clause} \
             ORDER BY created_at ASC \
             LIMIT $limit START $offset"
        );
        let mut builder = self
            .db
            .query(&page_query)
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(status) = status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<ProductRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_product())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

impl<C: Connection> ProductRepository for SurrealProductRepository<C> {
    async fn create(&self, input: CreateProduct) -> VendoraResult<Product> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('product', $id) SET \
                 tenant_id = $tenant_id, \
                 name = $name, \
                 description = $description, \
                 price = $price, \
                 currency = $currency, \
                 stock = $stock, \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("price", input.price))
            .bind(("currency", input.currency))
            .bind(("stock", input.stock))
            .bind(("status", status_to_string(input.status).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> VendoraResult<Product> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('product', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateProduct,
    ) -> VendoraResult<Product> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.price.is_some() {
            sets.push("price = $price");
        }
        if input.stock.is_some() {
            sets.push("stock = $stock");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('product', $id) SET {} \
             WHERE tenant_id = $tenant_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(price) = input.price {
            builder = builder.bind(("price", price));
        }
        if let Some(stock) = input.stock {
            builder = builder.bind(("stock", stock));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> VendoraResult<()> {
        // Soft-delete: set status to Inactive.
        self.db
            .query(
                "UPDATE type::record('product', $id) SET \
                 status = 'Inactive', updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Product>> {
        self.list_where(tenant_id, None, pagination).await
    }

    async fn list_by_status(
        &self,
        tenant_id: Uuid,
        status: ProductStatus,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Product>> {
        self.list_where(tenant_id, Some(status), pagination).await
    }

    async fn decrement_if_available(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        qty: u32,
    ) -> VendoraResult<bool> {
        // Single conditional write: the stock check and the decrement
        // are one statement, evaluated at write time. Optimistic
        // write conflicts re-run the whole statement, condition
        // included.
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = self
                .db
                .query(
                    "UPDATE type::record('product', $id) SET \
                     stock -= $qty, updated_at = time::now() \
                     WHERE tenant_id = $tenant_id \
                     AND status = 'Active' \
                     AND stock >= $qty \
                     RETURN AFTER",
                )
                .bind(("id", id.to_string()))
                .bind(("tenant_id", tenant_id.to_string()))
                .bind(("qty", qty))
                .await
                .and_then(|r| r.check());

            match outcome {
                Ok(mut result) => {
                    let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
                    return Ok(!rows.is_empty());
                }
                Err(e) if is_write_conflict(&e) && attempt < MAX_CONFLICT_RETRIES => continue,
                Err(e) => return Err(DbError::from(e).into()),
            }
        }
    }

    async fn restock(&self, tenant_id: Uuid, id: Uuid, qty: u32) -> VendoraResult<Product> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('product', $id) SET \
                 stock += $qty, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id \
                 RETURN AFTER",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("qty", qty))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }
}
