//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Money fields are decimals.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD status ON TABLE tenant TYPE string \
    ASSERT $value IN ['Active', 'Suspended', 'Archived'];
DEFINE FIELD template ON TABLE tenant TYPE string;
DEFINE FIELD settings ON TABLE tenant TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;

-- =======================================================================
-- Memberships (tenant scope; one per (tenant, user))
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE membership TYPE string;
DEFINE FIELD user_id ON TABLE membership TYPE string;
DEFINE FIELD email ON TABLE membership TYPE string;
DEFINE FIELD role ON TABLE membership TYPE string \
    ASSERT $value IN ['Owner', 'Admin', 'Staff', 'Editor', 'Viewer'];
DEFINE FIELD status ON TABLE membership TYPE string \
    ASSERT $value IN ['Active', 'Pending', 'Revoked'];
DEFINE FIELD created_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_tenant_user ON TABLE membership \
    COLUMNS tenant_id, user_id UNIQUE;

-- =======================================================================
-- Customers (tenant scope; unique email per tenant)
-- =======================================================================
DEFINE TABLE customer SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE customer TYPE string;
DEFINE FIELD email ON TABLE customer TYPE string;
DEFINE FIELD name ON TABLE customer TYPE string;
DEFINE FIELD phone ON TABLE customer TYPE option<string>;
DEFINE FIELD user_id ON TABLE customer TYPE option<string>;
DEFINE FIELD created_at ON TABLE customer TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE customer TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_customer_tenant_email ON TABLE customer \
    COLUMNS tenant_id, email UNIQUE;

-- =======================================================================
-- Products (tenant scope)
-- =======================================================================
DEFINE TABLE product SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE product TYPE string;
DEFINE FIELD name ON TABLE product TYPE string;
DEFINE FIELD description ON TABLE product TYPE string DEFAULT '';
DEFINE FIELD price ON TABLE product TYPE decimal;
DEFINE FIELD currency ON TABLE product TYPE string DEFAULT 'USD';
DEFINE FIELD stock ON TABLE product TYPE int ASSERT $value >= 0;
DEFINE FIELD status ON TABLE product TYPE string \
    ASSERT $value IN ['Active', 'Draft', 'Inactive'];
DEFINE FIELD created_at ON TABLE product TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE product TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_product_tenant ON TABLE product COLUMNS tenant_id;

-- =======================================================================
-- Orders (tenant scope; immutable item snapshots)
-- =======================================================================
DEFINE TABLE `order` SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE `order` TYPE string;
DEFINE FIELD order_number ON TABLE `order` TYPE string;
DEFINE FIELD status ON TABLE `order` TYPE string \
    ASSERT $value IN ['Pending', 'Confirmed', 'Processing', 'Shipped', \
    'Delivered', 'Cancelled', 'Refunded'];
DEFINE FIELD customer_id ON TABLE `order` TYPE string;
DEFINE FIELD customer_email ON TABLE `order` TYPE string;
DEFINE FIELD customer_name ON TABLE `order` TYPE string;
DEFINE FIELD shipping_address ON TABLE `order` TYPE option<string>;
DEFINE FIELD items ON TABLE `order` TYPE array;
DEFINE FIELD items.* ON TABLE `order` TYPE object FLEXIBLE;
DEFINE FIELD subtotal ON TABLE `order` TYPE decimal;
DEFINE FIELD tax ON TABLE `order` TYPE decimal;
DEFINE FIELD shipping ON TABLE `order` TYPE decimal;
DEFINE FIELD total ON TABLE `order` TYPE decimal;
DEFINE FIELD currency ON TABLE `order` TYPE string;
DEFINE FIELD created_at ON TABLE `order` TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE `order` TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_order_tenant_number ON TABLE `order` \
    COLUMNS tenant_id, order_number UNIQUE;
DEFINE INDEX idx_order_tenant_created ON TABLE `order` \
    COLUMNS tenant_id, created_at;

-- =======================================================================
-- Payments (tenant scope; one row per settlement attempt)
-- =======================================================================
DEFINE TABLE payment SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE payment TYPE string;
DEFINE FIELD order_id ON TABLE payment TYPE string;
DEFINE FIELD provider ON TABLE payment TYPE string;
DEFINE FIELD amount ON TABLE payment TYPE decimal;
DEFINE FIELD currency ON TABLE payment TYPE string;
DEFINE FIELD status ON TABLE payment TYPE string \
    ASSERT $value IN ['Pending', 'Completed', 'Failed'];
DEFINE FIELD transaction_id ON TABLE payment TYPE option<string>;
DEFINE FIELD processed_at ON TABLE payment TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE payment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_payment_tenant_order ON TABLE payment \
    COLUMNS tenant_id, order_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
