//! SurrealDB implementation of [`CustomerRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;
use vendora_core::error::{VendoraError, VendoraResult};
use vendora_core::models::customer::{CreateCustomer, Customer};
use vendora_core::repository::{CustomerRepository, PaginatedResult, Pagination};

use crate::error::{DbError, is_unique_violation};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct CustomerRow {
    tenant_id: String,
    email: String,
    name: String,
    phone: Option<String>,
    user_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CustomerRowWithId {
    record_id: String,
    tenant_id: String,
    email: String,
    name: String,
    phone: Option<String>,
    user_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_customer(self, id: Uuid) -> Result<Customer, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Query(format!("invalid tenant UUID: {e}")))?;
        Ok(Customer {
            id,
            tenant_id,
            email: self.email,
            name: self.name,
            phone: self.phone,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl CustomerRowWithId {
    fn try_into_customer(self) -> Result<Customer, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Query(format!("invalid tenant UUID: {e}")))?;
        Ok(Customer {
            id,
            tenant_id,
            email: self.email,
            name: self.name,
            phone: self.phone,
            user_id: self.user_id,
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

/// SurrealDB implementation of the Customer repository.
#[derive(Clone)]
pub struct SurrealCustomerRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCustomerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CustomerRepository for SurrealCustomerRepository<C> {
    async fn create(&self, input: CreateCustomer) -> VendoraResult<Customer> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let email = input.email.trim().to_ascii_lowercase();

        let result = self
            .db
            .query(
                "CREATE type::record('customer', $id) SET \
                 tenant_id = $tenant_id, \
                 email = $email, \
                 name = $name, \
                 phone = $phone, \
                 user_id = $user_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("email", email.clone()))
            .bind(("name", input.name))
            .bind(("phone", input.phone))
            .bind(("user_id", input.user_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            if is_unique_violation(&e) {
                DbError::AlreadyExists {
                    entity: format!("customer email={email}"),
                }
            } else {
                DbError::Query(e.to_string())
            }
        })?;

        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "customer".into(),
            id: id_str,
        })?;

        Ok(row.into_customer(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> VendoraResult<Customer> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('customer', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "customer".into(),
            id: id_str,
        })?;

        Ok(row.into_customer(id)?)
    }

    async fn get_by_email(&self, tenant_id: Uuid, email: &str) -> VendoraResult<Customer> {
        let email_norm = email.trim().to_ascii_lowercase();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM customer \
                 WHERE tenant_id = $tenant_id AND email = $email",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("email", email_norm))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CustomerRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "customer".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_customer()?)
    }

    async fn find_or_create_by_email(&self, input: CreateCustomer) -> VendoraResult<Customer> {
        // Upsert keyed on the (tenant_id, email) unique index. Two
        // concurrent checkouts for the same guest email race on the
        // CREATE; the loser re-fetches the winner's row.
        match self.get_by_email(input.tenant_id, &input.email).await {
            Ok(existing) => Ok(existing),
            Err(VendoraError::NotFound { .. }) => {
                let tenant_id = input.tenant_id;
                let email = input.email.clone();
                match self.create(input).await {
                    Ok(created) => Ok(created),
                    Err(VendoraError::AlreadyExists { .. }) => {
                        debug!(%tenant_id, %email, "lost customer upsert race, re-fetching");
                        self.get_by_email(tenant_id, &email).await
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Customer>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM customer \
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
                "SELECT meta::id(id) AS record_id, * FROM customer \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CustomerRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_customer())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
