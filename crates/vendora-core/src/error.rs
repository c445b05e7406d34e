//! Error types for the Vendora platform.
//!
//! Every failure maps to a machine-readable code plus a human-readable
//! message, so the surrounding API layer can surface the right status
//! without inspecting variant internals.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::access::AccessDenied;
use crate::models::order::OrderStatus;

#[derive(Debug, Error)]
pub enum VendoraError {
    #[error("Authentication failed: {reason}")]
    Unauthenticated { reason: String },

    #[error("Authorization denied: {0}")]
    AccessDenied(#[from] AccessDenied),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{0}")]
    BusinessRule(#[from] BusinessRule),

    #[error("Payment provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Business-rule violations — requests that are well-formed and
/// authorized but not permitted by commerce invariants.
#[derive(Debug, Error)]
pub enum BusinessRule {
    #[error("cart is empty")]
    CartEmpty,

    #[error("product {product_id} is unavailable")]
    ProductNotFound { product_id: Uuid },

    #[error("insufficient stock for product {product_id} (requested {requested})")]
    InsufficientStock { product_id: Uuid, requested: u32 },

    #[error("order is immutable in status {status:?}")]
    ImmutableOrder { status: OrderStatus },

    #[error("illegal order status transition {from:?} -> {to:?}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("payment amount {actual} does not match order total {expected}")]
    AmountMismatch { expected: Decimal, actual: Decimal },

    #[error("order {order_id} already has a completed payment")]
    AlreadyPaid { order_id: Uuid },

    #[error("tenant '{slug}' is suspended")]
    TenantSuspended { slug: String },

    #[error("tenant '{slug}' is archived and cannot be modified")]
    ImmutableTenant { slug: String },
}

impl VendoraError {
    /// Machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "UNAUTHENTICATED",
            Self::AccessDenied(denied) => match denied {
                AccessDenied::WrongUserType { .. } => "WRONG_USER_TYPE",
                AccessDenied::WrongTenant { .. } => "WRONG_TENANT",
                AccessDenied::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            },
            Self::NotFound { entity, .. } => match entity.as_str() {
                "tenant" => "TENANT_NOT_FOUND",
                "order" => "ORDER_NOT_FOUND",
                "product" => "PRODUCT_NOT_FOUND",
                _ => "NOT_FOUND",
            },
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::BusinessRule(rule) => match rule {
                BusinessRule::CartEmpty => "CART_EMPTY",
                BusinessRule::ProductNotFound { .. } => "PRODUCT_NOT_FOUND",
                BusinessRule::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
                BusinessRule::ImmutableOrder { .. } => "IMMUTABLE_ORDER",
                BusinessRule::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
                BusinessRule::AmountMismatch { .. } => "AMOUNT_MISMATCH",
                BusinessRule::AlreadyPaid { .. } => "ALREADY_PAID",
                BusinessRule::TenantSuspended { .. } => "TENANT_SUSPENDED",
                BusinessRule::ImmutableTenant { .. } => "IMMUTABLE_TENANT",
            },
            Self::Provider { .. } => "PROVIDER_FAILURE",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Suggested HTTP status for this error.
    ///
    /// `NotFound` on products maps to 400 rather than 404 because a
    /// missing product surfaces mid-checkout as a rejected cart line,
    /// not as a missing route target.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthenticated { .. } => 401,
            Self::AccessDenied(_) => 403,
            Self::NotFound { entity, .. } if entity == "product" => 400,
            Self::NotFound { .. } => 404,
            Self::AlreadyExists { .. } => 409,
            Self::Validation { .. } | Self::BusinessRule(_) => 400,
            Self::Provider { .. } => 502,
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }
}

pub type VendoraResult<T> = Result<T, VendoraError>;
