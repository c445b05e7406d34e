//! Membership domain model — the binding of a user to a tenant with a
//! staff role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff roles, ranked. The hierarchy is a total order used for
/// "at least role X" checks; `Staff` and `Editor` share a tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StaffRole {
    Owner,
    Admin,
    Staff,
    Editor,
    Viewer,
}

impl StaffRole {
    /// Numeric rank: Owner(4) > Admin(3) > Staff/Editor(2) > Viewer(1).
    ///
    /// Comparisons go through this rank so adding a role is a one-line
    /// change rather than a new branch at every call site.
    pub fn rank(self) -> u8 {
        match self {
            StaffRole::Owner => 4,
            StaffRole::Admin => 3,
            StaffRole::Staff | StaffRole::Editor => 2,
            StaffRole::Viewer => 1,
        }
    }

    /// `true` if this role satisfies a check requiring `required`.
    pub fn at_least(self, required: StaffRole) -> bool {
        self.rank() >= required.rank()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MembershipStatus {
    Active,
    Pending,
    Revoked,
}

/// One membership per (tenant, user) pair.
///
/// Created `Pending` on invite, flipped `Active` on acceptance, and
/// never hard-deleted — revocation flips status to `Revoked`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// External identity uid (subject of the verified token).
    pub user_id: String,
    pub email: String,
    pub role: StaffRole,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to invite a user to a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub tenant_id: Uuid,
    pub user_id: String,
    pub email: String,
    pub role: StaffRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ranks_are_totally_ordered() {
        assert!(StaffRole::Owner.rank() > StaffRole::Admin.rank());
        assert!(StaffRole::Admin.rank() > StaffRole::Staff.rank());
        assert!(StaffRole::Staff.rank() > StaffRole::Viewer.rank());
    }

    #[test]
    fn staff_and_editor_share_a_tier() {
        assert_eq!(StaffRole::Staff.rank(), StaffRole::Editor.rank());
        assert!(StaffRole::Editor.at_least(StaffRole::Staff));
        assert!(StaffRole::Staff.at_least(StaffRole::Editor));
    }

    #[test]
    fn higher_role_passes_lower_requirement() {
        assert!(StaffRole::Owner.at_least(StaffRole::Viewer));
        assert!(!StaffRole::Viewer.at_least(StaffRole::Owner));
    }
}
