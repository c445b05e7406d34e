//! Request identity — the three-tier user model.
//!
//! Every request resolves to exactly one [`UserContext`] variant, a
//! closed tagged union carrying only the fields relevant to that tier.
//! There is no multi-type identity and no default: unverifiable
//! credentials fail classification instead of falling back.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::membership::StaffRole;

/// The three disjoint user types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Customer,
    MerchantAdmin,
    PlatformAdmin,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Customer => "customer",
            UserType::MerchantAdmin => "merchant_admin",
            UserType::PlatformAdmin => "platform_admin",
        }
    }
}

/// Output of the external token-verification collaborator.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: String,
}

/// A classified request identity.
///
/// Downstream components consult this without re-verifying the
/// underlying credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UserContext {
    /// A shopper bound to one tenant's storefront.
    Customer {
        uid: String,
        email: String,
        tenant_id: Uuid,
        tenant_slug: String,
    },
    /// A staff member of one tenant, with a ranked role.
    MerchantAdmin {
        uid: String,
        email: String,
        tenant_id: Uuid,
        tenant_slug: String,
        role: StaffRole,
    },
    /// A platform operator. Not bound to any tenant.
    PlatformAdmin {
        uid: String,
        email: String,
        permissions: Vec<String>,
    },
}

impl UserContext {
    pub fn user_type(&self) -> UserType {
        match self {
            UserContext::Customer { .. } => UserType::Customer,
            UserContext::MerchantAdmin { .. } => UserType::MerchantAdmin,
            UserContext::PlatformAdmin { .. } => UserType::PlatformAdmin,
        }
    }

    pub fn uid(&self) -> &str {
        match self {
            UserContext::Customer { uid, .. }
            | UserContext::MerchantAdmin { uid, .. }
            | UserContext::PlatformAdmin { uid, .. } => uid,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            UserContext::Customer { email, .. }
            | UserContext::MerchantAdmin { email, .. }
            | UserContext::PlatformAdmin { email, .. } => email,
        }
    }

    /// The tenant this identity is bound to, if any.
    pub fn tenant_slug(&self) -> Option<&str> {
        match self {
            UserContext::Customer { tenant_slug, .. }
            | UserContext::MerchantAdmin { tenant_slug, .. } => Some(tenant_slug),
            UserContext::PlatformAdmin { .. } => None,
        }
    }

    /// The membership role, if this is a merchant admin.
    pub fn role(&self) -> Option<StaffRole> {
        match self {
            UserContext::MerchantAdmin { role, .. } => Some(*role),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_carry_only_their_fields() {
        let ctx = UserContext::PlatformAdmin {
            uid: "p1".into(),
            email: "ops@vendora.dev".into(),
            permissions: vec!["tenants:write".into()],
        };
        assert_eq!(ctx.user_type(), UserType::PlatformAdmin);
        assert!(ctx.tenant_slug().is_none());
        assert!(ctx.role().is_none());
    }

    #[test]
    fn merchant_admin_exposes_binding_and_role() {
        let ctx = UserContext::MerchantAdmin {
            uid: "m1".into(),
            email: "staff@acme.dev".into(),
            tenant_id: Uuid::new_v4(),
            tenant_slug: "acme".into(),
            role: StaffRole::Admin,
        };
        assert_eq!(ctx.tenant_slug(), Some("acme"));
        assert_eq!(ctx.role(), Some(StaffRole::Admin));
    }
}
