//! Tenant resolution — slug to tenant record.
//!
//! A resolver false-negative cascades into every downstream denial, so
//! transient storage errors are retried a bounded number of times
//! before surfacing. Suspended tenants resolve normally; suspension is
//! enforced by the business layer, not by hiding the tenant.

use std::time::Duration;

use tracing::warn;
use vendora_core::error::{VendoraError, VendoraResult};
use vendora_core::models::tenant::Tenant;
use vendora_core::repository::TenantRepository;

use crate::cache::ReadCache;

/// How many times a slug lookup is attempted before a transient
/// storage error is surfaced.
const MAX_ATTEMPTS: u32 = 3;

/// Normalize a slug for lookup: trimmed, lowercase.
pub fn normalize_slug(slug: &str) -> String {
    slug.trim().to_ascii_lowercase()
}

/// Resolves tenant slugs against the tenant repository.
#[derive(Clone)]
pub struct TenantResolver<T: TenantRepository> {
    repo: T,
}

impl<T: TenantRepository> TenantResolver<T> {
    pub fn new(repo: T) -> Self {
        Self { repo }
    }

    /// Resolve a slug against live storage.
    ///
    /// `NotFound` is authoritative and never retried; only transient
    /// storage errors are.
    pub async fn resolve_by_slug(&self, slug: &str) -> VendoraResult<Tenant> {
        let slug = normalize_slug(slug);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.repo.get_by_slug(&slug).await {
                Ok(tenant) => return Ok(tenant),
                Err(VendoraError::Storage(msg)) if attempt < MAX_ATTEMPTS => {
                    warn!(%slug, attempt, error = %msg, "transient storage error resolving tenant, retrying");
                    tokio::time::sleep(Duration::from_millis(25 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Resolve through the read cache. For read-mostly callers only —
    /// the checkout path resolves live.
    pub async fn resolve_cached(
        &self,
        cache: &impl ReadCache<Tenant>,
        slug: &str,
    ) -> VendoraResult<Tenant> {
        let slug = normalize_slug(slug);
        let key = format!("tenant:{slug}");
        cache
            .get_or_fetch(&key, || self.resolve_by_slug(&slug))
            .await
    }
}
