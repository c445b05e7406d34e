//! Role hierarchy and the per-request access gate.
//!
//! [`check_access`] is the single choke point every tenant-scoped
//! operation must pass through before touching tenant data. No
//! component is permitted to query tenant-scoped storage without
//! first obtaining an `Ok` from this gate.

use thiserror::Error;
use tracing::warn;

use crate::identity::{UserContext, UserType};
use crate::models::membership::StaffRole;

/// Why an access check was denied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("wrong user type: required {required:?}, caller is {actual:?}")]
    WrongUserType { required: UserType, actual: UserType },

    #[error("caller is not bound to tenant '{target}'")]
    WrongTenant { target: String },

    #[error("insufficient role: required at least {required:?}, caller has {actual:?}")]
    InsufficientRole {
        required: StaffRole,
        actual: Option<StaffRole>,
    },
}

/// Decide whether `ctx` may perform an operation that requires
/// `required_type`, optionally at least one of `required_roles`, on the
/// tenant identified by `target_slug`.
///
/// Rules, applied in order:
/// 1. User type must match, unless the caller is a platform admin.
/// 2. Tenant-bound callers must be bound to `target_slug`.
/// 3. If `required_roles` is non-empty, the caller's role must rank at
///    least the minimum of the required set.
///
/// Platform admins hold no membership and pass all three checks.
pub fn check_access(
    ctx: &UserContext,
    required_type: UserType,
    required_roles: &[StaffRole],
    target_slug: &str,
) -> Result<(), AccessDenied> {
    let actual = ctx.user_type();

    if actual == UserType::PlatformAdmin {
        return Ok(());
    }

    if actual != required_type {
        let denied = AccessDenied::WrongUserType {
            required: required_type,
            actual,
        };
        warn!(target_slug, %denied, "access denied");
        return Err(denied);
    }

    if matches!(required_type, UserType::MerchantAdmin | UserType::Customer) {
        let bound = ctx
            .tenant_slug()
            .is_some_and(|slug| slug.eq_ignore_ascii_case(target_slug));
        if !bound {
            let denied = AccessDenied::WrongTenant {
                target: target_slug.to_string(),
            };
            warn!(target_slug, %denied, "access denied");
            return Err(denied);
        }
    }

    if !required_roles.is_empty() {
        // "At least" semantics: the weakest listed role is the bar.
        let bar = required_roles
            .iter()
            .copied()
            .min_by_key(|r| r.rank())
            .unwrap_or(StaffRole::Owner);
        let holds = ctx.role().is_some_and(|r| r.at_least(bar));
        if !holds {
            let denied = AccessDenied::InsufficientRole {
                required: bar,
                actual: ctx.role(),
            };
            warn!(target_slug, %denied, "access denied");
            return Err(denied);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn merchant(slug: &str, role: StaffRole) -> UserContext {
        UserContext::MerchantAdmin {
            uid: "u1".into(),
            email: "staff@example.dev".into(),
            tenant_id: Uuid::new_v4(),
            tenant_slug: slug.into(),
            role,
        }
    }

    fn customer(slug: &str) -> UserContext {
        UserContext::Customer {
            uid: "c1".into(),
            email: "shopper@example.dev".into(),
            tenant_id: Uuid::new_v4(),
            tenant_slug: slug.into(),
        }
    }

    fn platform() -> UserContext {
        UserContext::PlatformAdmin {
            uid: "p1".into(),
            email: "ops@vendora.dev".into(),
            permissions: vec![],
        }
    }

    #[test]
    fn higher_role_passes_lower_requirement_and_not_vice_versa() {
        // For all r1 > r2: r1 passes a check requiring r2; r2 fails one
        // requiring r1.
        let ranked = [
            StaffRole::Viewer,
            StaffRole::Staff,
            StaffRole::Admin,
            StaffRole::Owner,
        ];
        for (i, &lower) in ranked.iter().enumerate() {
            for &higher in &ranked[i + 1..] {
                let ctx_high = merchant("acme", higher);
                let ctx_low = merchant("acme", lower);
                assert!(
                    check_access(&ctx_high, UserType::MerchantAdmin, &[lower], "acme").is_ok()
                );
                assert!(
                    check_access(&ctx_low, UserType::MerchantAdmin, &[higher], "acme").is_err()
                );
            }
        }
    }

    #[test]
    fn staff_denied_where_admin_passes() {
        let required = [StaffRole::Owner, StaffRole::Admin];
        let staff = merchant("acme", StaffRole::Staff);
        let admin = merchant("acme", StaffRole::Admin);

        let denied = check_access(&staff, UserType::MerchantAdmin, &required, "acme").unwrap_err();
        assert!(matches!(denied, AccessDenied::InsufficientRole { .. }));

        assert!(check_access(&admin, UserType::MerchantAdmin, &required, "acme").is_ok());
    }

    #[test]
    fn tenant_binding_is_enforced() {
        let ctx = merchant("acme", StaffRole::Owner);
        let denied = check_access(&ctx, UserType::MerchantAdmin, &[], "globex").unwrap_err();
        assert_eq!(
            denied,
            AccessDenied::WrongTenant {
                target: "globex".into()
            }
        );

        let shopper = customer("acme");
        assert!(check_access(&shopper, UserType::Customer, &[], "acme").is_ok());
        assert!(check_access(&shopper, UserType::Customer, &[], "globex").is_err());
    }

    #[test]
    fn wrong_user_type_is_checked_first() {
        let shopper = customer("acme");
        let denied =
            check_access(&shopper, UserType::MerchantAdmin, &[StaffRole::Viewer], "acme")
                .unwrap_err();
        assert!(matches!(denied, AccessDenied::WrongUserType { .. }));
    }

    #[test]
    fn platform_admin_bypasses_type_tenant_and_role_checks() {
        let ops = platform();
        assert!(check_access(&ops, UserType::MerchantAdmin, &[StaffRole::Owner], "acme").is_ok());
        assert!(check_access(&ops, UserType::Customer, &[], "globex").is_ok());
        assert!(check_access(&ops, UserType::PlatformAdmin, &[], "").is_ok());
    }

    #[test]
    fn slug_comparison_ignores_case() {
        let ctx = merchant("acme", StaffRole::Viewer);
        assert!(check_access(&ctx, UserType::MerchantAdmin, &[], "ACME").is_ok());
    }
}
