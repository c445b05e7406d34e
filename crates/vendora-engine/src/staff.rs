//! Staff management — the membership lifecycle behind the access gate.
//!
//! Invites are created `Pending` and flipped `Active` when the invited
//! user accepts with their own identity. Revocation is soft; the
//! membership row is never removed.

use tracing::info;
use vendora_core::access::check_access;
use vendora_core::error::{VendoraError, VendoraResult};
use vendora_core::identity::{UserContext, UserType};
use vendora_core::models::membership::{CreateMembership, Membership, StaffRole};
use vendora_core::models::tenant::Tenant;
use vendora_core::repository::{MembershipRepository, PaginatedResult, Pagination};

/// Roles that may manage staff.
const MANAGE_ROLES: &[StaffRole] = &[StaffRole::Owner, StaffRole::Admin];
/// Roles that may view the staff list.
const READ_ROLES: &[StaffRole] = &[
    StaffRole::Owner,
    StaffRole::Admin,
    StaffRole::Staff,
    StaffRole::Viewer,
];

pub struct StaffService<M: MembershipRepository> {
    memberships: M,
}

impl<M: MembershipRepository> StaffService<M> {
    pub fn new(memberships: M) -> Self {
        Self { memberships }
    }

    /// Invite a user to the tenant's staff.
    pub async fn invite(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        user_id: &str,
        email: &str,
        role: StaffRole,
    ) -> VendoraResult<Membership> {
        check_access(ctx, UserType::MerchantAdmin, MANAGE_ROLES, &tenant.slug)?;

        let membership = self
            .memberships
            .invite(CreateMembership {
                tenant_id: tenant.id,
                user_id: user_id.to_string(),
                email: email.to_string(),
                role,
            })
            .await?;
        info!(
            tenant = %tenant.slug,
            user_id,
            role = ?role,
            "staff invite created"
        );
        Ok(membership)
    }

    /// Accept the caller's own pending invite.
    ///
    /// No role requirement — the caller has no membership yet. The
    /// invite accepted is always the one addressed to the caller's
    /// verified uid.
    pub async fn accept_invite(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
    ) -> VendoraResult<Membership> {
        let accepted = self.memberships.accept(tenant.id, ctx.uid()).await?;
        info!(tenant = %tenant.slug, user_id = ctx.uid(), "staff invite accepted");
        Ok(accepted)
    }

    /// Change a member's role.
    pub async fn set_role(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        user_id: &str,
        role: StaffRole,
    ) -> VendoraResult<Membership> {
        check_access(ctx, UserType::MerchantAdmin, MANAGE_ROLES, &tenant.slug)?;

        // Nobody demotes themselves by accident.
        if ctx.uid() == user_id {
            return Err(VendoraError::Validation {
                message: "cannot change your own role".into(),
            });
        }

        self.memberships.set_role(tenant.id, user_id, role).await
    }

    /// Revoke a membership (soft).
    pub async fn revoke(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        user_id: &str,
    ) -> VendoraResult<()> {
        check_access(ctx, UserType::MerchantAdmin, MANAGE_ROLES, &tenant.slug)?;

        if ctx.uid() == user_id {
            return Err(VendoraError::Validation {
                message: "cannot revoke your own membership".into(),
            });
        }

        self.memberships.revoke(tenant.id, user_id).await?;
        info!(tenant = %tenant.slug, user_id, "staff membership revoked");
        Ok(())
    }

    /// List the tenant's staff.
    pub async fn list(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Membership>> {
        check_access(ctx, UserType::MerchantAdmin, READ_ROLES, &tenant.slug)?;
        self.memberships.list(tenant.id, pagination).await
    }
}
