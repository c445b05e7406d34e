//! Tenant domain model.
//!
//! A tenant is an isolated store on the platform. All commerce entities
//! (products, customers, orders, payments, memberships) are scoped to a
//! tenant; the tenant is the unit of data partitioning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a tenant.
///
/// `Archived` is terminal: once archived, a tenant can never transition
/// to any other status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TenantStatus {
    Active,
    Suspended,
    Archived,
}

impl TenantStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TenantStatus::Archived)
    }
}

/// An isolated store on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// URL-safe unique identifier (e.g., `acme`). Lowercase, immutable.
    pub slug: String,
    /// Human-readable store name.
    pub name: String,
    pub status: TenantStatus,
    /// Storefront template identifier.
    pub template: String,
    /// Arbitrary per-store settings (payment provider, locale, ...).
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Default payment provider from settings, falling back to `mock`.
    pub fn payment_provider(&self) -> &str {
        self.settings
            .get("payment_provider")
            .and_then(|v| v.as_str())
            .unwrap_or("mock")
    }
}

/// Fields required to create a new tenant (platform provisioning).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub slug: String,
    pub name: String,
    pub template: String,
    pub settings: Option<serde_json::Value>,
}

/// Fields that can be updated on an existing tenant.
///
/// The slug is immutable and deliberately absent. Status updates on an
/// archived tenant are rejected at the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub template: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub status: Option<TenantStatus>,
}
