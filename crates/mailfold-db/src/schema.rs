//! Schema definitions and migration runner for SurrealDB.
//!
//! The app client registry is SCHEMAFULL with unique indexes on
//! `name` and `public_key` — the index is the real duplicate-name
//! guarantee; application-level existence checks are a fast path.
//! Subscriber partitions are per-client tables created on first
//! write, so they cannot be defined here; `daily_visits` is
//! schemaless because each record carries only the counters that
//! have been incremented.

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
-- App clients (the tenant registry, global scope)
-- =======================================================================
DEFINE TABLE app_client SCHEMAFULL;
DEFINE FIELD name ON TABLE app_client TYPE string;
DEFINE FIELD website ON TABLE app_client TYPE string;
DEFINE FIELD email ON TABLE app_client TYPE string;
DEFINE FIELD public_key ON TABLE app_client TYPE string;
DEFINE FIELD client_salt ON TABLE app_client TYPE string;
DEFINE FIELD collection_name ON TABLE app_client TYPE string;
DEFINE FIELD is_active ON TABLE app_client TYPE bool DEFAULT true;
DEFINE FIELD token_lifetime_days ON TABLE app_client TYPE int \
    DEFAULT 365;
DEFINE FIELD created_at ON TABLE app_client TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE app_client TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_app_client_name ON TABLE app_client \
    COLUMNS name UNIQUE;
DEFINE INDEX idx_app_client_public_key ON TABLE app_client \
    COLUMNS public_key UNIQUE;

-- =======================================================================
-- Daily visit counters (keyed {namespace}_{date}, schemaless)
-- =======================================================================
DEFINE TABLE daily_visits SCHEMALESS;
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
