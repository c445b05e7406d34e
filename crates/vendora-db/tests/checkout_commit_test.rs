//! Integration tests for the atomic checkout commit using in-memory
//! SurrealDB.

use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;
use vendora_core::models::order::{CreateOrder, OrderItem, OrderStatus};
use vendora_core::models::payment::PaymentStatus;
use vendora_core::models::product::{CreateProduct, Product, ProductStatus};
use vendora_core::repository::{CheckoutStore, OrderRepository, ProductRepository};
use vendora_db::repository::{
    SurrealCheckoutStore, SurrealOrderRepository, SurrealProductRepository,
};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vendora_db::run_migrations(&db).await.unwrap();
    db
}

async fn seed_product(
    db: &Surreal<surrealdb::engine::local::Db>,
    tenant_id: Uuid,
    name: &str,
    cents: i64,
    stock: u32,
) -> Product {
    SurrealProductRepository::new(db.clone())
        .create(CreateProduct {
            tenant_id,
            name: name.into(),
            description: String::new(),
            price: Decimal::new(cents, 2),
            currency: "USD".into(),
            stock,
            status: ProductStatus::Active,
        })
        .await
        .unwrap()
}

/// Helper: build a one-or-more-line order input priced from products.
fn order_input(tenant_id: Uuid, number: &str, lines: &[(&Product, u32)]) -> CreateOrder {
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(p, qty)| OrderItem {
            product_id: p.id,
            name_snapshot: p.name.clone(),
            price_snapshot: p.price,
            qty: *qty,
            line_total: p.price * Decimal::from(*qty),
        })
        .collect();
    let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
    CreateOrder {
        tenant_id,
        order_number: number.into(),
        customer_id: Uuid::new_v4(),
        customer_email: "shopper@example.dev".into(),
        customer_name: "Test Shopper".into(),
        shipping_address: None,
        items,
        subtotal,
        tax: Decimal::ZERO,
        shipping: Decimal::ZERO,
        total: subtotal,
        currency: "USD".into(),
    }
}

#[tokio::test]
async fn commit_creates_order_payment_and_decrements_stock() {
    let db = setup().await;
    let tenant_id = Uuid::new_v4();
    let widget = seed_product(&db, tenant_id, "Widget", 1000, 5).await;
    let gadget = seed_product(&db, tenant_id, "Gadget", 2550, 2).await;

    let store = SurrealCheckoutStore::new(db.clone());
    let (order, payment) = store
        .commit(
            order_input(tenant_id, "VO-TEST000001", &[(&widget, 2), (&gadget, 1)]),
            "mock",
        )
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.order_number, "VO-TEST000001");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total, Decimal::new(4550, 2));
    assert_eq!(order.subtotal + order.tax + order.shipping, order.total);

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.order_id, order.id);
    assert_eq!(payment.amount, order.total);
    assert_eq!(payment.provider, "mock");

    let products = SurrealProductRepository::new(db);
    assert_eq!(
        products.get_by_id(tenant_id, widget.id).await.unwrap().stock,
        3
    );
    assert_eq!(
        products.get_by_id(tenant_id, gadget.id).await.unwrap().stock,
        1
    );
}

#[tokio::test]
async fn failed_line_rolls_back_every_decrement() {
    let db = setup().await;
    let tenant_id = Uuid::new_v4();
    let plenty = seed_product(&db, tenant_id, "Plenty", 1000, 10).await;
    let scarce = seed_product(&db, tenant_id, "Scarce", 1000, 1).await;

    let store = SurrealCheckoutStore::new(db.clone());
    let err = store
        .commit(
            order_input(tenant_id, "VO-TEST000002", &[(&plenty, 2), (&scarce, 3)]),
            "mock",
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    assert!(
        err.to_string().contains(&scarce.id.to_string()),
        "error must name the offending product: {err}"
    );

    // All-or-nothing: the first line's decrement was rolled back.
    let products = SurrealProductRepository::new(db.clone());
    assert_eq!(
        products.get_by_id(tenant_id, plenty.id).await.unwrap().stock,
        10
    );
    assert_eq!(
        products.get_by_id(tenant_id, scarce.id).await.unwrap().stock,
        1
    );

    // And no partial order was created.
    let orders = SurrealOrderRepository::new(db);
    let list = orders
        .list(tenant_id, Default::default())
        .await
        .unwrap();
    assert_eq!(list.total, 0);
}

#[tokio::test]
async fn concurrent_commits_never_oversell() {
    let db = setup().await;
    let tenant_id = Uuid::new_v4();
    let scarce = seed_product(&db, tenant_id, "Scarce", 1000, 1).await;

    // Two simultaneous checkouts for the last unit: exactly one order.
    let store_a = SurrealCheckoutStore::new(db.clone());
    let store_b = SurrealCheckoutStore::new(db.clone());
    let input_a = order_input(tenant_id, "VO-TESTRACE01", &[(&scarce, 1)]);
    let input_b = order_input(tenant_id, "VO-TESTRACE02", &[(&scarce, 1)]);

    let (res_a, res_b) = tokio::join!(
        store_a.commit(input_a, "mock"),
        store_b.commit(input_b, "mock"),
    );

    let successes = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one checkout may win the last unit");

    for res in [res_a, res_b] {
        if let Err(err) = res {
            assert_eq!(err.code(), "INSUFFICIENT_STOCK");
        }
    }

    let products = SurrealProductRepository::new(db);
    assert_eq!(
        products.get_by_id(tenant_id, scarce.id).await.unwrap().stock,
        0
    );
}

#[tokio::test]
async fn orders_are_isolated_per_tenant() {
    let db = setup().await;
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();
    let widget = seed_product(&db, tenant_a, "Widget", 1000, 5).await;

    let store = SurrealCheckoutStore::new(db.clone());
    let (order, _) = store
        .commit(order_input(tenant_a, "VO-TEST000003", &[(&widget, 1)]), "mock")
        .await
        .unwrap();

    let orders = SurrealOrderRepository::new(db);
    // Same id under the wrong tenant resolves to nothing.
    assert!(orders.get_by_id(tenant_b, order.id).await.is_err());
    assert!(orders.get_by_id(tenant_a, order.id).await.is_ok());

    let list_b = orders.list(tenant_b, Default::default()).await.unwrap();
    assert_eq!(list_b.total, 0);
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let db = setup().await;
    let tenant_id = Uuid::new_v4();

    let store = SurrealCheckoutStore::new(db);
    let err = store
        .commit(order_input(tenant_id, "VO-TEST000004", &[]), "mock")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}
