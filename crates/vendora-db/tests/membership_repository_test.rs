//! Integration tests for the Membership repository using in-memory
//! SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;
use vendora_core::models::membership::{CreateMembership, MembershipStatus, StaffRole};
use vendora_core::repository::{MembershipRepository, Pagination};
use vendora_db::repository::SurrealMembershipRepository;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vendora_db::run_migrations(&db).await.unwrap();
    db
}

fn invite_input(tenant_id: Uuid, user_id: &str, role: StaffRole) -> CreateMembership {
    CreateMembership {
        tenant_id,
        user_id: user_id.into(),
        email: format!("{user_id}@example.dev"),
        role,
    }
}

#[tokio::test]
async fn invite_creates_pending_membership() {
    let db = setup().await;
    let repo = SurrealMembershipRepository::new(db);
    let tenant_id = Uuid::new_v4();

    let membership = repo
        .invite(invite_input(tenant_id, "staff-1", StaffRole::Staff))
        .await
        .unwrap();

    assert_eq!(membership.status, MembershipStatus::Pending);
    assert_eq!(membership.role, StaffRole::Staff);
    assert_eq!(membership.tenant_id, tenant_id);
}

#[tokio::test]
async fn accept_flips_pending_to_active() {
    let db = setup().await;
    let repo = SurrealMembershipRepository::new(db);
    let tenant_id = Uuid::new_v4();

    repo.invite(invite_input(tenant_id, "staff-1", StaffRole::Admin))
        .await
        .unwrap();

    let accepted = repo.accept(tenant_id, "staff-1").await.unwrap();
    assert_eq!(accepted.status, MembershipStatus::Active);

    // Accepting again is idempotent.
    let again = repo.accept(tenant_id, "staff-1").await.unwrap();
    assert_eq!(again.status, MembershipStatus::Active);
}

#[tokio::test]
async fn one_membership_per_tenant_user_pair() {
    let db = setup().await;
    let repo = SurrealMembershipRepository::new(db);
    let tenant_id = Uuid::new_v4();

    repo.invite(invite_input(tenant_id, "staff-1", StaffRole::Staff))
        .await
        .unwrap();
    let result = repo
        .invite(invite_input(tenant_id, "staff-1", StaffRole::Viewer))
        .await;
    assert!(result.is_err(), "second invite for the pair should fail");

    // Same user under a different tenant is a distinct membership.
    repo.invite(invite_input(Uuid::new_v4(), "staff-1", StaffRole::Viewer))
        .await
        .unwrap();
}

#[tokio::test]
async fn role_change_is_persisted() {
    let db = setup().await;
    let repo = SurrealMembershipRepository::new(db);
    let tenant_id = Uuid::new_v4();

    repo.invite(invite_input(tenant_id, "staff-1", StaffRole::Staff))
        .await
        .unwrap();
    repo.accept(tenant_id, "staff-1").await.unwrap();

    let updated = repo
        .set_role(tenant_id, "staff-1", StaffRole::Admin)
        .await
        .unwrap();
    assert_eq!(updated.role, StaffRole::Admin);

    let fetched = repo.get(tenant_id, "staff-1").await.unwrap();
    assert_eq!(fetched.role, StaffRole::Admin);
}

#[tokio::test]
async fn revoke_is_a_soft_delete() {
    let db = setup().await;
    let repo = SurrealMembershipRepository::new(db);
    let tenant_id = Uuid::new_v4();

    repo.invite(invite_input(tenant_id, "staff-1", StaffRole::Owner))
        .await
        .unwrap();
    repo.accept(tenant_id, "staff-1").await.unwrap();
    repo.revoke(tenant_id, "staff-1").await.unwrap();

    // The row survives with Revoked status.
    let fetched = repo.get(tenant_id, "staff-1").await.unwrap();
    assert_eq!(fetched.status, MembershipStatus::Revoked);
}

#[tokio::test]
async fn list_is_scoped_to_tenant() {
    let db = setup().await;
    let repo = SurrealMembershipRepository::new(db);
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();

    for i in 0..3 {
        repo.invite(invite_input(tenant_a, &format!("a-{i}"), StaffRole::Staff))
            .await
            .unwrap();
    }
    repo.invite(invite_input(tenant_b, "b-0", StaffRole::Owner))
        .await
        .unwrap();

    let list_a = repo.list(tenant_a, Pagination::default()).await.unwrap();
    assert_eq!(list_a.total, 3);
    let list_b = repo.list(tenant_b, Pagination::default()).await.unwrap();
    assert_eq!(list_b.total, 1);
}
