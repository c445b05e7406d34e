//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter to enforce data isolation: a lookup
//! scoped to tenant A can never return an entity owned by tenant B,
//! even with an identical id.

use uuid::Uuid;

use crate::error::VendoraResult;
use crate::models::{
    customer::{CreateCustomer, Customer},
    membership::{CreateMembership, Membership, StaffRole},
    order::{CreateOrder, Order, UpdateOrder},
    payment::{CreatePayment, Payment},
    product::{CreateProduct, Product, ProductStatus, UpdateProduct},
    tenant::{CreateTenant, Tenant, UpdateTenant},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenants (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = VendoraResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VendoraResult<Tenant>> + Send;
    /// Lookup by slug. Callers are expected to pass a normalized
    /// (lowercase) slug; see the tenant resolver.
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = VendoraResult<Tenant>> + Send;
    /// Update name/template/settings/status. A status update on an
    /// archived tenant fails with `ImmutableTenant`.
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = VendoraResult<Tenant>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = VendoraResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

pub trait MembershipRepository: Send + Sync {
    /// Create a `Pending` membership (invite). One membership per
    /// (tenant, user) pair.
    fn invite(
        &self,
        input: CreateMembership,
    ) -> impl Future<Output = VendoraResult<Membership>> + Send;
    /// Flip a `Pending` membership to `Active` (invite acceptance).
    fn accept(
        &self,
        tenant_id: Uuid,
        user_id: &str,
    ) -> impl Future<Output = VendoraResult<Membership>> + Send;
    fn get(
        &self,
        tenant_id: Uuid,
        user_id: &str,
    ) -> impl Future<Output = VendoraResult<Membership>> + Send;
    fn set_role(
        &self,
        tenant_id: Uuid,
        user_id: &str,
        role: StaffRole,
    ) -> impl Future<Output = VendoraResult<Membership>> + Send;
    /// Soft-delete: flips status to `Revoked`, never removes the row.
    fn revoke(
        &self,
        tenant_id: Uuid,
        user_id: &str,
    ) -> impl Future<Output = VendoraResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = VendoraResult<PaginatedResult<Membership>>> + Send;
}

pub trait CustomerRepository: Send + Sync {
    fn create(&self, input: CreateCustomer)
    -> impl Future<Output = VendoraResult<Customer>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VendoraResult<Customer>> + Send;
    fn get_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> impl Future<Output = VendoraResult<Customer>> + Send;
    /// Upsert keyed on the (tenant, email) unique index. Under
    /// concurrent creation the loser of the index race re-fetches and
    /// returns the winner's row.
    fn find_or_create_by_email(
        &self,
        input: CreateCustomer,
    ) -> impl Future<Output = VendoraResult<Customer>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = VendoraResult<PaginatedResult<Customer>>> + Send;
}

pub trait ProductRepository: Send + Sync {
    fn create(&self, input: CreateProduct) -> impl Future<Output = VendoraResult<Product>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VendoraResult<Product>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateProduct,
    ) -> impl Future<Output = VendoraResult<Product>> + Send;
    /// Soft-delete: sets status to `Inactive`.
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = VendoraResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = VendoraResult<PaginatedResult<Product>>> + Send;
    fn list_by_status(
        &self,
        tenant_id: Uuid,
        status: ProductStatus,
        pagination: Pagination,
    ) -> impl Future<Output = VendoraResult<PaginatedResult<Product>>> + Send;

    /// Conditionally decrement stock: succeeds (returns `true`) only if
    /// the product is active and has at least `qty` on hand at write
    /// time. A single conditional write — never a read-then-write pair.
    fn decrement_if_available(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        qty: u32,
    ) -> impl Future<Output = VendoraResult<bool>> + Send;

    /// Add `qty` back to stock (restock / cancellation compensation).
    fn restock(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        qty: u32,
    ) -> impl Future<Output = VendoraResult<Product>> + Send;
}

pub trait OrderRepository: Send + Sync {
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VendoraResult<Order>> + Send;
    fn get_by_number(
        &self,
        tenant_id: Uuid,
        order_number: &str,
    ) -> impl Future<Output = VendoraResult<Order>> + Send;
    /// Patch mutable fields. The persistence layer refuses writes to
    /// orders already in a terminal status.
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateOrder,
    ) -> impl Future<Output = VendoraResult<Order>> + Send;
    /// Newest first.
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = VendoraResult<PaginatedResult<Order>>> + Send;
}

pub trait PaymentRepository: Send + Sync {
    fn create(&self, input: CreatePayment) -> impl Future<Output = VendoraResult<Payment>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VendoraResult<Payment>> + Send;
    /// Newest first.
    fn list_by_order(
        &self,
        tenant_id: Uuid,
        order_id: Uuid,
    ) -> impl Future<Output = VendoraResult<Vec<Payment>>> + Send;
    fn mark_completed(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        transaction_id: &str,
    ) -> impl Future<Output = VendoraResult<Payment>> + Send;
    fn mark_failed(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VendoraResult<Payment>> + Send;
}

// ---------------------------------------------------------------------------
// Checkout commit (cross-table, transactional)
// ---------------------------------------------------------------------------

/// The atomic checkout commit: for every order line, conditionally
/// decrement the product's stock; create the order in `Pending`; create
/// its pending payment. All statements execute in one storage
/// transaction — a failed stock condition on any line aborts the whole
/// commit with `InsufficientStock`, leaving no partial order and no
/// partial decrement.
pub trait CheckoutStore: Send + Sync {
    fn commit(
        &self,
        order: CreateOrder,
        payment_provider: &str,
    ) -> impl Future<Output = VendoraResult<(Order, Payment)>> + Send;
}
