//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vendora_core::error::{BusinessRule, VendoraError, VendoraResult};
use vendora_core::models::tenant::{CreateTenant, Tenant, TenantStatus, UpdateTenant};
use vendora_core::repository::{PaginatedResult, Pagination, TenantRepository};

use crate::error::{DbError, is_unique_violation};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    slug: String,
    name: String,
    status: String,
    template: String,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    slug: String,
    name: String,
    status: String,
    template: String,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<TenantStatus, DbError> {
    match s {
        "Active" => Ok(TenantStatus::Active),
        "Suspended" => Ok(TenantStatus::Suspended),
        "Archived" => Ok(TenantStatus::Archived),
        other => Err(DbError::Query(format!("unknown tenant status: {other}"))),
    }
}

fn status_to_string(s: TenantStatus) -> &'static str {
    match s {
        TenantStatus::Active => "Active",
        TenantStatus::Suspended => "Suspended",
        TenantStatus::Archived => "Archived",
    }
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        Ok(Tenant {
            id,
            slug: self.slug,
            name: self.name,
            status: parse_status(&self.status)?,
            template: self.template,
            settings: self.settings,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        Ok(Tenant {
            id,
            slug: self.slug,
            name: self.name,
            status: parse_status(&self.status)?,
            template: self.template,
            settings: self.settings,
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

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> VendoraResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        // Slugs are stored lowercase; lookups normalize the same way.
        let slug = input.slug.trim().to_ascii_lowercase();
        let settings = input
            .settings
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 slug = $slug, name = $name, \
                 status = 'Active', \
                 template = $template, \
                 settings = $settings",
            )
            .bind(("id", id_str.clone()))
            .bind(("slug", slug.clone()))
            .bind(("name", input.name))
            .bind(("template", input.template))
            .bind(("settings", settings))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            if is_unique_violation(&e) {
                DbError::AlreadyExists {
                    entity: format!("tenant slug={slug}"),
                }
            } else {
                DbError::Query(e.to_string())
            }
        })?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> VendoraResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_slug(&self, slug: &str) -> VendoraResult<Tenant> {
        let slug_owned = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM tenant \
                 WHERE slug = $slug",
            )
            .bind(("slug", slug_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> VendoraResult<Tenant> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.template.is_some() {
            sets.push("template = $template");
        }
        if input.settings.is_some() {
            sets.push("settings = $settings");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        // Archived is terminal: the guard makes the update a no-op on
        // archived tenants, distinguished from NotFound below.
        let query = format!(
            "UPDATE type::record('tenant', $id) SET {} \
             WHERE status != 'Archived'",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(template) = input.template {
            builder = builder.bind(("template", template));
        }
        if let Some(settings) = input.settings {
            builder = builder.bind(("settings", settings));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(row.into_tenant(id)?),
            None => {
                // Either the tenant does not exist or it is archived.
                let current = self.get_by_id(id).await?;
                Err(VendoraError::BusinessRule(BusinessRule::ImmutableTenant {
                    slug: current.slug,
                }))
            }
        }
    }

    async fn list(&self, pagination: Pagination) -> VendoraResult<PaginatedResult<Tenant>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM tenant GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM tenant \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_tenant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
