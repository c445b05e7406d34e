//! Order administration — gated reads, status patches, cancellation.
//!
//! Every operation here passes through the access gate before touching
//! tenant storage. Terminal orders (`Delivered`, `Cancelled`,
//! `Refunded`) are immutable: any attempted transition out of them
//! fails loudly with `ImmutableOrder` rather than silently no-opping.
//! The persistence layer carries the same guard as a backstop against
//! races.

use tracing::info;
use uuid::Uuid;
use vendora_core::access::check_access;
use vendora_core::error::{BusinessRule, VendoraError, VendoraResult};
use vendora_core::identity::{UserContext, UserType};
use vendora_core::models::membership::StaffRole;
use vendora_core::models::order::{Order, OrderStatus, UpdateOrder};
use vendora_core::models::tenant::Tenant;
use vendora_core::repository::{OrderRepository, PaginatedResult, Pagination};

/// Roles that may mutate orders.
const WRITE_ROLES: &[StaffRole] = &[StaffRole::Owner, StaffRole::Admin, StaffRole::Staff];
/// Roles that may read orders.
const READ_ROLES: &[StaffRole] = &[
    StaffRole::Owner,
    StaffRole::Admin,
    StaffRole::Staff,
    StaffRole::Viewer,
];

pub struct OrderService<O: OrderRepository> {
    orders: O,
}

impl<O: OrderRepository> OrderService<O> {
    pub fn new(orders: O) -> Self {
        Self { orders }
    }

    /// Fetch one order for the tenant's back office.
    pub async fn get_order(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        order_id: Uuid,
    ) -> VendoraResult<Order> {
        check_access(ctx, UserType::MerchantAdmin, READ_ROLES, &tenant.slug)?;
        self.orders.get_by_id(tenant.id, order_id).await
    }

    /// List the tenant's orders, newest first.
    pub async fn list_orders(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        pagination: Pagination,
    ) -> VendoraResult<PaginatedResult<Order>> {
        check_access(ctx, UserType::MerchantAdmin, READ_ROLES, &tenant.slug)?;
        self.orders.list(tenant.id, pagination).await
    }

    /// Patch an order, re-validating business rules.
    ///
    /// A status patch must be a legal transition from the current
    /// status; any write against a terminal order fails.
    pub async fn update_order(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        order_id: Uuid,
        patch: UpdateOrder,
    ) -> VendoraResult<Order> {
        check_access(ctx, UserType::MerchantAdmin, WRITE_ROLES, &tenant.slug)?;

        let current = self.orders.get_by_id(tenant.id, order_id).await?;

        if current.status.is_terminal() {
            return Err(VendoraError::BusinessRule(BusinessRule::ImmutableOrder {
                status: current.status,
            }));
        }

        if let Some(next) = patch.status
            && !current.status.can_transition_to(next)
        {
            return Err(VendoraError::BusinessRule(
                BusinessRule::InvalidStatusTransition {
                    from: current.status,
                    to: next,
                },
            ));
        }

        let updated = self.orders.update(tenant.id, order_id, patch).await?;
        if updated.status != current.status {
            info!(
                tenant = %tenant.slug,
                order_number = %updated.order_number,
                from = ?current.status,
                to = ?updated.status,
                "order status changed"
            );
        }
        Ok(updated)
    }

    /// Soft-transition an order to `Cancelled`.
    pub async fn cancel_order(
        &self,
        ctx: &UserContext,
        tenant: &Tenant,
        order_id: Uuid,
    ) -> VendoraResult<Order> {
        self.update_order(
            ctx,
            tenant,
            order_id,
            UpdateOrder {
                status: Some(OrderStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
    }
}
