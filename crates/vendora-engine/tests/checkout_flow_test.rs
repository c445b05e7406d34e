//! End-to-end checkout and payment flows against in-memory SurrealDB.

use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use vendora_core::identity::UserContext;
use vendora_core::models::cart::Cart;
use vendora_core::models::order::OrderStatus;
use vendora_core::models::payment::PaymentStatus;
use vendora_core::models::product::{CreateProduct, Product, ProductStatus};
use vendora_core::models::tenant::{CreateTenant, Tenant, TenantStatus, UpdateTenant};
use vendora_core::pricing::ZeroRates;
use vendora_core::repository::{
    CustomerRepository, OrderRepository, PaymentRepository, ProductRepository, TenantRepository,
};
use vendora_db::repository::{
    SurrealCheckoutStore, SurrealCustomerRepository, SurrealOrderRepository,
    SurrealPaymentRepository, SurrealProductRepository, SurrealTenantRepository,
};
use vendora_engine::payment::MockProvider;
use vendora_engine::{
    CheckoutService, CustomerInfo, PaymentIntent, PaymentService, TenantResolver,
};

type Engine = CheckoutService<
    SurrealTenantRepository<Db>,
    SurrealProductRepository<Db>,
    SurrealCustomerRepository<Db>,
    SurrealCheckoutStore<Db>,
    ZeroRates,
>;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vendora_db::run_migrations(&db).await.unwrap();
    db
}

fn engine(db: &Surreal<Db>) -> Engine {
    CheckoutService::new(
        TenantResolver::new(SurrealTenantRepository::new(db.clone())),
        SurrealProductRepository::new(db.clone()),
        SurrealCustomerRepository::new(db.clone()),
        SurrealCheckoutStore::new(db.clone()),
        ZeroRates,
    )
}

async fn seed_tenant(db: &Surreal<Db>, slug: &str) -> Tenant {
    SurrealTenantRepository::new(db.clone())
        .create(CreateTenant {
            slug: slug.into(),
            name: format!("Store {slug}"),
            template: "default".into(),
            settings: None,
        })
        .await
        .unwrap()
}

async fn seed_product(
    db: &Surreal<Db>,
    tenant_id: Uuid,
    name: &str,
    cents: i64,
    stock: u32,
    status: ProductStatus,
) -> Product {
    SurrealProductRepository::new(db.clone())
        .create(CreateProduct {
            tenant_id,
            name: name.into(),
            description: String::new(),
            price: Decimal::new(cents, 2),
            currency: "USD".into(),
            stock,
            status,
        })
        .await
        .unwrap()
}

fn guest_info() -> CustomerInfo {
    CustomerInfo {
        email: "shopper@example.dev".into(),
        name: "Test Shopper".into(),
        phone: None,
        shipping_address: None,
    }
}

#[tokio::test]
async fn checkout_bills_live_prices_and_clears_the_cart() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "acme").await;
    // Live price 10.00, cart snapshot 9.00 — live price wins.
    let p1 = seed_product(&db, tenant.id, "Widget", 1000, 5, ProductStatus::Active).await;

    let mut cart = Cart::new("acme", "USD");
    cart.add(p1.id, "Widget", Decimal::new(900, 2), 2);

    let outcome = engine(&db)
        .checkout("acme", None, &mut cart, &guest_info())
        .await
        .unwrap();

    assert_eq!(outcome.order.subtotal, Decimal::new(2000, 2));
    assert_eq!(outcome.order.total, Decimal::new(2000, 2));
    assert_eq!(outcome.order.items[0].price_snapshot, Decimal::new(1000, 2));
    assert_eq!(outcome.order.status, OrderStatus::Pending);
    assert_eq!(outcome.payment.status, PaymentStatus::Pending);
    assert_eq!(outcome.payment.amount, outcome.order.total);
    assert!(cart.is_empty(), "successful checkout clears the cart");

    let live = SurrealProductRepository::new(db)
        .get_by_id(tenant.id, p1.id)
        .await
        .unwrap();
    assert_eq!(live.stock, 3);
}

#[tokio::test]
async fn failed_checkout_leaves_stock_and_cart_untouched() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "acme").await;
    let plenty = seed_product(&db, tenant.id, "Plenty", 1000, 10, ProductStatus::Active).await;
    let scarce = seed_product(&db, tenant.id, "Scarce", 1000, 1, ProductStatus::Active).await;

    let mut cart = Cart::new("acme", "USD");
    cart.add(plenty.id, "Plenty", Decimal::new(1000, 2), 2);
    cart.add(scarce.id, "Scarce", Decimal::new(1000, 2), 3);

    let err = engine(&db)
        .checkout("acme", None, &mut cart, &guest_info())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    assert!(err.to_string().contains(&scarce.id.to_string()));

    // Idempotent failure: nothing moved.
    assert_eq!(cart.items.len(), 2, "failed checkout keeps the cart");
    let products = SurrealProductRepository::new(db.clone());
    assert_eq!(products.get_by_id(tenant.id, plenty.id).await.unwrap().stock, 10);
    assert_eq!(products.get_by_id(tenant.id, scarce.id).await.unwrap().stock, 1);

    let orders = SurrealOrderRepository::new(db);
    assert_eq!(orders.list(tenant.id, Default::default()).await.unwrap().total, 0);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let db = setup().await;
    seed_tenant(&db, "acme").await;

    let mut cart = Cart::new("acme", "USD");
    let err = engine(&db)
        .checkout("acme", None, &mut cart, &guest_info())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CART_EMPTY");
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn unknown_tenant_is_rejected() {
    let db = setup().await;

    let mut cart = Cart::new("ghost", "USD");
    cart.add(Uuid::new_v4(), "Widget", Decimal::new(1000, 2), 1);

    let err = engine(&db)
        .checkout("ghost", None, &mut cart, &guest_info())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TENANT_NOT_FOUND");
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn suspended_tenant_cannot_check_out() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "paused").await;
    let p1 = seed_product(&db, tenant.id, "Widget", 1000, 5, ProductStatus::Active).await;
    SurrealTenantRepository::new(db.clone())
        .update(
            tenant.id,
            UpdateTenant {
                status: Some(TenantStatus::Suspended),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut cart = Cart::new("paused", "USD");
    cart.add(p1.id, "Widget", Decimal::new(1000, 2), 1);

    let err = engine(&db)
        .checkout("paused", None, &mut cart, &guest_info())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TENANT_SUSPENDED");
}

#[tokio::test]
async fn non_active_product_rejects_the_whole_checkout() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "acme").await;
    let live = seed_product(&db, tenant.id, "Live", 1000, 5, ProductStatus::Active).await;
    let draft = seed_product(&db, tenant.id, "Draft", 1000, 5, ProductStatus::Draft).await;

    let mut cart = Cart::new("acme", "USD");
    cart.add(live.id, "Live", Decimal::new(1000, 2), 1);
    cart.add(draft.id, "Draft", Decimal::new(1000, 2), 1);

    let err = engine(&db)
        .checkout("acme", None, &mut cart, &guest_info())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PRODUCT_NOT_FOUND");

    // Validation happens before any decrement.
    let products = SurrealProductRepository::new(db);
    assert_eq!(products.get_by_id(tenant.id, live.id).await.unwrap().stock, 5);
}

#[tokio::test]
async fn two_simultaneous_checkouts_for_the_last_unit() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "acme").await;
    let p1 = seed_product(&db, tenant.id, "Last One", 1000, 1, ProductStatus::Active).await;

    let engine_a = engine(&db);
    let engine_b = engine(&db);
    let mut cart_a = Cart::new("acme", "USD");
    cart_a.add(p1.id, "Last One", Decimal::new(1000, 2), 1);
    let mut cart_b = cart_a.clone();

    let info_a = CustomerInfo {
        email: "a@example.dev".into(),
        ..guest_info()
    };
    let info_b = CustomerInfo {
        email: "b@example.dev".into(),
        ..guest_info()
    };

    let (res_a, res_b) = tokio::join!(
        engine_a.checkout("acme", None, &mut cart_a, &info_a),
        engine_b.checkout("acme", None, &mut cart_b, &info_b),
    );

    let mut winners = 0;
    for res in [&res_a, &res_b] {
        match res {
            Ok(outcome) => {
                winners += 1;
                assert_eq!(outcome.order.total, Decimal::new(1000, 2));
            }
            Err(err) => assert_eq!(err.code(), "INSUFFICIENT_STOCK"),
        }
    }
    assert_eq!(winners, 1, "exactly one checkout wins the last unit");

    let live = SurrealProductRepository::new(db)
        .get_by_id(tenant.id, p1.id)
        .await
        .unwrap();
    assert_eq!(live.stock, 0);
}

#[tokio::test]
async fn payment_amount_tolerance_and_confirmation() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "acme").await;
    let p1 = seed_product(&db, tenant.id, "Widget", 1000, 5, ProductStatus::Active).await;

    let mut cart = Cart::new("acme", "USD");
    cart.add(p1.id, "Widget", Decimal::new(1000, 2), 2);
    let outcome = engine(&db)
        .checkout("acme", None, &mut cart, &guest_info())
        .await
        .unwrap();
    assert_eq!(outcome.order.total, Decimal::new(2000, 2));

    let payments = PaymentService::new(
        SurrealOrderRepository::new(db.clone()),
        SurrealPaymentRepository::new(db.clone()),
    );
    let provider = MockProvider::new();

    // 19.98 is outside the 0.01 tolerance.
    let err = payments
        .process(
            tenant.id,
            PaymentIntent {
                order_id: outcome.order.id,
                amount: Decimal::new(1998, 2),
                currency: "USD".into(),
            },
            &provider,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AMOUNT_MISMATCH");

    // 20.00 settles and confirms the order.
    let settled = payments
        .process(
            tenant.id,
            PaymentIntent {
                order_id: outcome.order.id,
                amount: Decimal::new(2000, 2),
                currency: "USD".into(),
            },
            &provider,
        )
        .await
        .unwrap();
    assert_eq!(settled.status, PaymentStatus::Completed);
    assert!(settled.transaction_id.is_some());

    let order = SurrealOrderRepository::new(db)
        .get_by_id(tenant.id, outcome.order.id)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn provider_failure_keeps_order_pending_and_allows_retry() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "acme").await;
    let p1 = seed_product(&db, tenant.id, "Widget", 1000, 5, ProductStatus::Active).await;

    let mut cart = Cart::new("acme", "USD");
    cart.add(p1.id, "Widget", Decimal::new(1000, 2), 1);
    let outcome = engine(&db)
        .checkout("acme", None, &mut cart, &guest_info())
        .await
        .unwrap();

    let payments = PaymentService::new(
        SurrealOrderRepository::new(db.clone()),
        SurrealPaymentRepository::new(db.clone()),
    );
    let intent = PaymentIntent {
        order_id: outcome.order.id,
        amount: outcome.order.total,
        currency: "USD".into(),
    };

    let err = payments
        .process(tenant.id, intent.clone(), &MockProvider::failing())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PROVIDER_FAILURE");

    // Order untouched, failed attempt recorded.
    let order_repo = SurrealOrderRepository::new(db.clone());
    assert_eq!(
        order_repo.get_by_id(tenant.id, outcome.order.id).await.unwrap().status,
        OrderStatus::Pending
    );

    // The retry is a fresh payment record, and it settles.
    let settled = payments
        .process(tenant.id, intent, &MockProvider::new())
        .await
        .unwrap();
    assert_eq!(settled.status, PaymentStatus::Completed);
    assert_ne!(settled.id, outcome.payment.id);

    let history = SurrealPaymentRepository::new(db)
        .list_by_order(tenant.id, outcome.order.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn settled_orders_reject_further_payments() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "acme").await;
    let p1 = seed_product(&db, tenant.id, "Widget", 1000, 5, ProductStatus::Active).await;

    let mut cart = Cart::new("acme", "USD");
    cart.add(p1.id, "Widget", Decimal::new(1000, 2), 1);
    let outcome = engine(&db)
        .checkout("acme", None, &mut cart, &guest_info())
        .await
        .unwrap();

    let payments = PaymentService::new(
        SurrealOrderRepository::new(db.clone()),
        SurrealPaymentRepository::new(db),
    );
    let intent = PaymentIntent {
        order_id: outcome.order.id,
        amount: outcome.order.total,
        currency: "USD".into(),
    };

    payments
        .process(tenant.id, intent.clone(), &MockProvider::new())
        .await
        .unwrap();
    let err = payments
        .process(tenant.id, intent, &MockProvider::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ALREADY_PAID");
}

#[tokio::test]
async fn guest_customers_are_reused_by_email() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "acme").await;
    let p1 = seed_product(&db, tenant.id, "Widget", 1000, 9, ProductStatus::Active).await;

    let service = engine(&db);
    let mut first = Cart::new("acme", "USD");
    first.add(p1.id, "Widget", Decimal::new(1000, 2), 1);
    let a = service
        .checkout("acme", None, &mut first, &guest_info())
        .await
        .unwrap();

    let mut second = Cart::new("acme", "USD");
    second.add(p1.id, "Widget", Decimal::new(1000, 2), 1);
    let b = service
        .checkout("acme", None, &mut second, &guest_info())
        .await
        .unwrap();

    assert_eq!(a.order.customer_id, b.order.customer_id);
}

#[tokio::test]
async fn authenticated_customer_session_binds_the_identity() {
    let db = setup().await;
    let tenant = seed_tenant(&db, "acme").await;
    let p1 = seed_product(&db, tenant.id, "Widget", 1000, 5, ProductStatus::Active).await;

    let identity = UserContext::Customer {
        uid: "firebase-uid-1".into(),
        email: "logged-in@example.dev".into(),
        tenant_id: tenant.id,
        tenant_slug: "acme".into(),
    };

    let mut cart = Cart::new("acme", "USD");
    cart.add(p1.id, "Widget", Decimal::new(1000, 2), 1);
    let outcome = engine(&db)
        .checkout("acme", Some(&identity), &mut cart, &guest_info())
        .await
        .unwrap();

    // The session email wins over the submitted form email.
    assert_eq!(outcome.order.customer_email, "logged-in@example.dev");

    let customer = SurrealCustomerRepository::new(db)
        .get_by_email(tenant.id, "logged-in@example.dev")
        .await
        .unwrap();
    assert_eq!(customer.user_id.as_deref(), Some("firebase-uid-1"));
}
