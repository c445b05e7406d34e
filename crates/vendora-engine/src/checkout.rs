//! The checkout engine — cart to committed order.
//!
//! Orchestrates the full checkout flow: tenant resolution, customer
//! identity, cart re-validation against live product data, pricing,
//! and the atomic commit. Any failure before or during the commit
//! leaves stock and the cart untouched.

use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use tracing::{debug, info};
use vendora_core::error::{BusinessRule, VendoraError, VendoraResult};
use vendora_core::identity::UserContext;
use vendora_core::models::cart::{Cart, MAX_QTY, MIN_QTY};
use vendora_core::models::customer::CreateCustomer;
use vendora_core::models::order::{CreateOrder, Order, OrderItem};
use vendora_core::models::payment::Payment;
use vendora_core::models::tenant::{Tenant, TenantStatus};
use vendora_core::pricing::PricingPolicy;
use vendora_core::repository::{
    CheckoutStore, CustomerRepository, ProductRepository, TenantRepository,
};

use crate::tenant::TenantResolver;

/// Customer details submitted with a checkout.
#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub shipping_address: Option<String>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub payment: Payment,
}

/// Generate a unique order number: `VO-` plus ten uppercase
/// alphanumerics. Uniqueness is backed by the storage index.
fn generate_order_number() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(10)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("VO-{suffix}")
}

/// The checkout/order engine.
///
/// Generic over repository implementations so the engine has no
/// dependency on the database crate.
pub struct CheckoutService<T, P, C, K, Po>
where
    T: TenantRepository,
    P: ProductRepository,
    C: CustomerRepository,
    K: CheckoutStore,
    Po: PricingPolicy,
{
    tenants: TenantResolver<T>,
    products: P,
    customers: C,
    store: K,
    pricing: Po,
}

impl<T, P, C, K, Po> CheckoutService<T, P, C, K, Po>
where
    T: TenantRepository,
    P: ProductRepository,
    C: CustomerRepository,
    K: CheckoutStore,
    Po: PricingPolicy,
{
    pub fn new(
        tenants: TenantResolver<T>,
        products: P,
        customers: C,
        store: K,
        pricing: Po,
    ) -> Self {
        Self {
            tenants,
            products,
            customers,
            store,
            pricing,
        }
    }

    /// Convert a cart into a committed order with a pending payment.
    ///
    /// On success the cart is cleared; on any failure the cart and all
    /// product stock are left exactly as they were.
    pub async fn checkout(
        &self,
        tenant_slug: &str,
        identity: Option<&UserContext>,
        cart: &mut Cart,
        info: &CustomerInfo,
    ) -> VendoraResult<CheckoutOutcome> {
        // 1. Resolve the tenant — live, never through the cache.
        let tenant = self.tenants.resolve_by_slug(tenant_slug).await?;
        match tenant.status {
            TenantStatus::Active => {}
            TenantStatus::Suspended => {
                return Err(VendoraError::BusinessRule(BusinessRule::TenantSuspended {
                    slug: tenant.slug,
                }));
            }
            TenantStatus::Archived => {
                return Err(VendoraError::NotFound {
                    entity: "tenant".into(),
                    id: format!("slug={}", tenant.slug),
                });
            }
        }

        // 2. Resolve the customer: authenticated session if present,
        //    otherwise find-or-create a guest record keyed by email.
        let customer = self.resolve_customer(&tenant, identity, info).await?;

        // 3. An empty cart has nothing to commit.
        if cart.is_empty() {
            return Err(VendoraError::BusinessRule(BusinessRule::CartEmpty));
        }

        // 4. Re-validate every line against live product data. Billing
        //    uses the live price; the cart snapshot is informational.
        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            if !(MIN_QTY..=MAX_QTY).contains(&line.qty) {
                return Err(VendoraError::Validation {
                    message: format!(
                        "quantity {} for product {} is outside [{MIN_QTY}, {MAX_QTY}]",
                        line.qty, line.product_id
                    ),
                });
            }

            let product = match self.products.get_by_id(tenant.id, line.product_id).await {
                Ok(p) => p,
                Err(VendoraError::NotFound { .. }) => {
                    return Err(VendoraError::BusinessRule(BusinessRule::ProductNotFound {
                        product_id: line.product_id,
                    }));
                }
                Err(e) => return Err(e),
            };
            if !product.purchasable() {
                return Err(VendoraError::BusinessRule(BusinessRule::ProductNotFound {
                    product_id: line.product_id,
                }));
            }

            if product.price != line.price_snapshot {
                debug!(
                    product_id = %product.id,
                    cart_price = %line.price_snapshot,
                    live_price = %product.price,
                    "price changed since the cart snapshot, billing live price"
                );
            }

            items.push(OrderItem {
                product_id: product.id,
                name_snapshot: product.name.clone(),
                price_snapshot: product.price,
                qty: line.qty,
                line_total: product.price * Decimal::from(line.qty),
            });
        }

        // 5. Totals from live prices plus the pricing policy.
        let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
        let tax = self.pricing.tax(subtotal);
        let shipping = self.pricing.shipping(subtotal);
        let total = subtotal + tax + shipping;

        // 6. Atomic commit: every stock decrement, the order, and the
        //    pending payment succeed or fail together.
        let order_number = generate_order_number();
        let (order, payment) = self
            .store
            .commit(
                CreateOrder {
                    tenant_id: tenant.id,
                    order_number,
                    customer_id: customer.id,
                    customer_email: customer.email.clone(),
                    customer_name: customer.name.clone(),
                    shipping_address: info.shipping_address.clone(),
                    items,
                    subtotal,
                    tax,
                    shipping,
                    total,
                    currency: cart.currency.clone(),
                },
                tenant.payment_provider(),
            )
            .await?;

        // 7. The order owns the lines now; drop the cart contents.
        cart.clear();

        info!(
            tenant = %tenant.slug,
            order_number = %order.order_number,
            total = %order.total,
            "checkout complete"
        );

        // 8. Hand back the committed pair.
        Ok(CheckoutOutcome { order, payment })
    }

    /// Find the customer record for this checkout.
    ///
    /// An authenticated customer session bound to this tenant wins;
    /// anything else is a guest keyed by the submitted email.
    async fn resolve_customer(
        &self,
        tenant: &Tenant,
        identity: Option<&UserContext>,
        info: &CustomerInfo,
    ) -> VendoraResult<vendora_core::models::customer::Customer> {
        let (email, user_id) = match identity {
            Some(UserContext::Customer {
                uid,
                email,
                tenant_slug,
                ..
            }) if tenant_slug.eq_ignore_ascii_case(&tenant.slug) => {
                (email.clone(), Some(uid.clone()))
            }
            _ => (info.email.trim().to_ascii_lowercase(), None),
        };

        if email.is_empty() || !email.contains('@') {
            return Err(VendoraError::Validation {
                message: "a valid customer email is required".into(),
            });
        }

        let name = if info.name.trim().is_empty() {
            email.clone()
        } else {
            info.name.trim().to_string()
        };

        self.customers
            .find_or_create_by_email(CreateCustomer {
                tenant_id: tenant.id,
                email,
                name,
                phone: info.phone.clone(),
                user_id,
            })
            .await
    }
}
