//! Product catalog — storefront reads and gated admin writes.
//!
//! The storefront listing is public and serves only `Active` products,
//! optionally through the read cache. Every write goes through the
//! access gate; `Staff` and `Editor` share a tier, so either may edit
//! the catalog.

use tracing::info;
use uuid::Uuid;
use vendora_core::access::check_access;
use vendora_core::error::VendoraResult;
use vendora_core::identity::{UserContext, UserType};
use vendora_core::models::membership::StaffRole;
use vendora_core::models::product::{CreateProduct, Product, ProductStatus, UpdateProduct};
use vendora_core::models::tenant::Tenant;
use vendora_core::repository::{PaginatedResult, Pagination, ProductRepository};

/// Roles that may edit the catalog.
const EDIT_ROLES: &[StaffRole] = &[
    StaffRole::Owner,
    StaffRole::Admin,
    StaffRole::Staff,
    StaffRole::Editor,
];
/// Roles that may view the full (drafts included) catalog.
const READ_ROLES: &[StaffRole] = &[
    StaffRole::Owner,
    StaffRole::Admin,
    StaffRole::Staff,
    StaffRole::Editor,
    StaffRole::Viewer,
];

pub struct CatalogService<P: ProductRepository> {
    products: P,
}

impl<P: ProductRepository> CatalogService<P> {
    pub fn new(products: P) -> Self {
        Self { products }
    }

    /// Public storefront listing: active products only, no gate.
    pub async fn storefront_products(
        &self,
        tenant: &Tenant,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Product>> {
        self.products
            .list_by_status(tenant.id, ProductStatus::Active, pagination)
            .await
    }

    /// Back-office listing: every status.
    pub async fn list_products(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Product>> {
        check_access(ctx, UserType::MerchantAdmin, READ_ROLES, &tenant.slug)?;
        self.products.list(tenant.id, pagination).await
    }

    pub async fn create_product(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        input: CreateProduct,
    ) -> VendoraResult<Product> {
        check_access(ctx, UserType::MerchantAdmin, EDIT_ROLES, &tenant.slug)?;

        let product = self
            .products
            .create(CreateProduct {
                tenant_id: tenant.id,
                ..input
            })
            .await?;
        info!(
            tenant = %tenant.slug,
            product_id = %product.id,
            name = %product.name,
            "product created"
        );
        Ok(product)
    }

    pub async fn update_product(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        product_id: Uuid,
        patch: UpdateProduct,
    ) -> VendoraResult<Product> {
        check_access(ctx, UserType::MerchantAdmin, EDIT_ROLES, &tenant.slug)?;
        self.products.update(tenant.id, product_id, patch).await
    }

    /// Soft-delete a product (status flips to `Inactive`).
    pub async fn delete_product(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        product_id: Uuid,
    ) -> VendoraResult<()> {
        check_access(ctx, UserType::MerchantAdmin, EDIT_ROLES, &tenant.slug)?;
        self.products.delete(tenant.id, product_id).await
    }

    /// Put returned or corrected stock back on the shelf.
    pub async fn restock(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        product_id: Uuid,
        qty: u32,
    ) -> VendoraResult<Product> {
        check_access(ctx, UserType::MerchantAdmin, EDIT_ROLES, &tenant.slug)?;

        let product = self.products.restock(tenant.id, product_id, qty).await?;
        info!(
            tenant = %tenant.slug,
            product_id = %product.id,
            stock = product.stock,
            "product restocked"
        );
        Ok(product)
    }
}
