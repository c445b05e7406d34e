//! Integration tests for the Tenant repository using in-memory
//! SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use vendora_core::error::VendoraError;
use vendora_core::models::tenant::{CreateTenant, TenantStatus, UpdateTenant};
use vendora_core::repository::{Pagination, TenantRepository};
use vendora_db::repository::SurrealTenantRepository;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vendora_db::run_migrations(&db).await.unwrap();
    db
}

fn create_input(slug: &str) -> CreateTenant {
    CreateTenant {
        slug: slug.into(),
        name: format!("Store {slug}"),
        template: "default".into(),
        settings: None,
    }
}

#[tokio::test]
async fn create_and_get_tenant() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(create_input("acme")).await.unwrap();
    assert_eq!(tenant.slug, "acme");
    assert_eq!(tenant.status, TenantStatus::Active);

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.id, tenant.id);
    assert_eq!(fetched.slug, "acme");
}

#[tokio::test]
async fn slug_is_normalized_to_lowercase_on_create() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(create_input("  AcMe  ")).await.unwrap();
    assert_eq!(tenant.slug, "acme");

    let fetched = repo.get_by_slug("acme").await.unwrap();
    assert_eq!(fetched.id, tenant.id);
}

#[tokio::test]
async fn duplicate_slug_rejected() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    repo.create(create_input("unique")).await.unwrap();
    let result = repo.create(create_input("unique")).await;
    assert!(result.is_err(), "duplicate slug should be rejected");
}

#[tokio::test]
async fn suspended_tenant_still_resolves() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(create_input("paused")).await.unwrap();
    repo.update(
        tenant.id,
        UpdateTenant {
            status: Some(TenantStatus::Suspended),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Suspension is enforced by the business layer, not by hiding the
    // tenant from lookups.
    let fetched = repo.get_by_slug("paused").await.unwrap();
    assert_eq!(fetched.status, TenantStatus::Suspended);
}

#[tokio::test]
async fn archived_tenant_is_immutable() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(create_input("done")).await.unwrap();
    repo.update(
        tenant.id,
        UpdateTenant {
            status: Some(TenantStatus::Archived),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // No status transition out of Archived, and no other mutation.
    for patch in [
        UpdateTenant {
            status: Some(TenantStatus::Active),
            ..Default::default()
        },
        UpdateTenant {
            name: Some("revived".into()),
            ..Default::default()
        },
    ] {
        let err = repo.update(tenant.id, patch).await.unwrap_err();
        assert_eq!(err.code(), "IMMUTABLE_TENANT");
    }

    let current = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(current.status, TenantStatus::Archived);
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let err = repo.get_by_slug("ghost").await.unwrap_err();
    assert!(matches!(err, VendoraError::NotFound { .. }));
    assert_eq!(err.code(), "TENANT_NOT_FOUND");
}

#[tokio::test]
async fn list_tenants_with_pagination() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    for i in 0..5 {
        repo.create(create_input(&format!("store-{i}"))).await.unwrap();
    }

    let page1 = repo
        .list(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 5);

    let page2 = repo
        .list(Pagination {
            offset: 3,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 2);
    assert_eq!(page2.total, 5);
}
