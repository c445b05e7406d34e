//! Database-specific error types and conversions.

use vendora_core::error::VendoraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },
}

impl From<DbError> for VendoraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => VendoraError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => VendoraError::AlreadyExists { entity },
            other => VendoraError::Storage(other.to_string()),
        }
    }
}

/// Whether a SurrealDB error is a unique-index violation.
///
/// Used to turn concurrent duplicate creates into `AlreadyExists`
/// instead of opaque storage failures.
pub fn is_unique_violation(err: &surrealdb::Error) -> bool {
    let msg = err.to_string();
    msg.contains("already contains") || msg.contains("Database index")
}

/// Whether a SurrealDB error is an optimistic-concurrency conflict.
///
/// SurrealDB commits transactions optimistically; simultaneous writers
/// against the same record can fail with a retryable conflict. Callers
/// on contended write paths retry a bounded number of times.
pub(crate) fn is_write_conflict(err: &surrealdb::Error) -> bool {
    let msg = err.to_string().to_ascii_lowercase();
    msg.contains("conflict") || msg.contains("can be retried")
}

/// Upper bound on retries for conflicted writes.
pub(crate) const MAX_CONFLICT_RETRIES: u32 = 5;
