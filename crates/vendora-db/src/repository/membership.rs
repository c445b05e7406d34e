//! SurrealDB implementation of [`MembershipRepository`].
//!
//! Memberships are never hard-deleted: revocation flips status to
//! `Revoked`, preserving the (tenant, user) row for audit history.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vendora_core::error::{VendoraError, VendoraResult};
use vendora_core::models::membership::{
    CreateMembership, Membership, MembershipStatus, StaffRole,
};
use vendora_core::repository::{MembershipRepository, PaginatedResult, Pagination};

use crate::error::{DbError, is_unique_violation};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct MembershipRow {
    tenant_id: String,
    user_id: String,
    email: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct MembershipRowWithId {
    record_id: String,
    tenant_id: String,
    user_id: String,
    email: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<StaffRole, DbError> {
    match s {
        "Owner" => Ok(StaffRole::Owner),
        "Admin" => Ok(StaffRole::Admin),
        "Staff" => Ok(StaffRole::Staff),
        "Editor" => Ok(StaffRole::Editor),
        "Viewer" => Ok(StaffRole::Viewer),
        other => Err(DbError::Query(format!("unknown staff role: {other}"))),
    }
}

fn role_to_string(r: StaffRole) -> &'static str {
    match r {
        StaffRole::Owner => "Owner",
        StaffRole::Admin => "Admin",
        StaffRole::Staff => "Staff",
        StaffRole::Editor => "Editor",
        StaffRole::Viewer => "Viewer",
    }
}

fn parse_status(s: &str) -> Result<MembershipStatus, DbError> {
    match s {
        "Active" => Ok(MembershipStatus::Active),
        "Pending" => Ok(MembershipStatus::Pending),
        "Revoked" => Ok(MembershipStatus::Revoked),
        other => Err(DbError::Query(format!(
            "unknown membership status: {other}"
        ))),
    }
}

impl MembershipRow {
    fn into_membership(self, id: Uuid) -> Result<Membership, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Query(format!("invalid tenant UUID: {e}")))?;
        Ok(Membership {
            id,
            tenant_id,
            user_id: self.user_id,
            email: self.email,
            role: parse_role(&self.role)?,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl MembershipRowWithId {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Query(format!("invalid tenant UUID: {e}")))?;
        Ok(Membership {
            id,
            tenant_id,
            user_id: self.user_id,
            email: self.email,
            role: parse_role(&self.role)?,
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

/// SurrealDB implementation of the Membership repository.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn get_with_id(&self, tenant_id: Uuid, user_id: &str) -> VendoraResult<Membership> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE tenant_id = $tenant_id AND user_id = $user_id",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: format!("tenant={tenant_id},user={user_id}"),
        })?;

        Ok(row.try_into_membership()?)
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn invite(&self, input: CreateMembership) -> VendoraResult<Membership> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('membership', $id) SET \
                 tenant_id = $tenant_id, \
                 user_id = $user_id, \
                 email = $email, \
                 role = $role, \
                 status = 'Pending'",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("user_id", input.user_id))
            .bind(("email", input.email))
            .bind(("role", role_to_string(input.role).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            if is_unique_violation(&e) {
                DbError::AlreadyExists {
                    entity: "membership".into(),
                }
            } else {
                DbError::Query(e.to_string())
            }
        })?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: id_str,
        })?;

        Ok(row.into_membership(id)?)
    }

    async fn accept(&self, tenant_id: Uuid, user_id: &str) -> VendoraResult<Membership> {
        let mut result = self
            .db
            .query(
                "UPDATE membership SET \
                 status = 'Active', updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND user_id = $user_id \
                 AND status = 'Pending' \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        if let Some(row) = rows.into_iter().next() {
            return Ok(row.try_into_membership()?);
        }

        // Nothing was pending: accepting an already-active membership is
        // idempotent; anything else is a validation failure.
        let current = self.get_with_id(tenant_id, user_id).await?;
        match current.status {
            MembershipStatus::Active => Ok(current),
            _ => Err(VendoraError::Validation {
                message: format!(
                    "membership for user {user_id} is {:?}, not pending",
                    current.status
                ),
            }),
        }
    }

    async fn get(&self, tenant_id: Uuid, user_id: &str) -> VendoraResult<Membership> {
        self.get_with_id(tenant_id, user_id).await
    }

    async fn set_role(
        &self,
        tenant_id: Uuid,
        user_id: &str,
        role: StaffRole,
    ) -> VendoraResult<Membership> {
        let mut result = self
            .db
            .query(
                "UPDATE membership SET \
                 role = $role, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND user_id = $user_id \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("role", role_to_string(role).to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: format!("tenant={tenant_id},user={user_id}"),
        })?;

        Ok(row.try_into_membership()?)
    }

    async fn revoke(&self, tenant_id: Uuid, user_id: &str) -> VendoraResult<()> {
        // Soft-delete: flips status, keeps the row.
        self.db
            .query(
                "UPDATE membership SET \
                 status = 'Revoked', updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND user_id = $user_id",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Membership>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM membership \
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
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_membership())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
