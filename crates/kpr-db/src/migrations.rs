//! # Database Migrations
//!
//! Embedded SQL migrations, one directory per backend.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  Database::new()                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Pick the migrator for the backend                                     │
//! │       ├── Sqlite   → migrations/sqlite/                                │
//! │       └── Postgres → migrations/postgres/                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Compare embedded migrations vs _sqlx_migrations                       │
//! │       │                                                                 │
//! │       └── 0001_init.sql   usuarios, produtos, cores, galeria           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Run pending migrations in order, record each one                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Add the same numbered file to BOTH `migrations/sqlite/` and `migrations/postgres/`
//! 2. Name format: `NNNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::migrate::Migrator;
use tracing::info;

use crate::error::DbResult;
use crate::query::Backend;
use crate::storage::Storage;

/// Schema for the row-file backend (`INTEGER PRIMARY KEY AUTOINCREMENT`).
static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Schema for the client-server backend (`BIGSERIAL`).
static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("../../migrations/postgres");

fn migrator(backend: Backend) -> &'static Migrator {
    match backend {
        Backend::Sqlite => &SQLITE_MIGRATOR,
        Backend::Postgres => &POSTGRES_MIGRATOR,
    }
}

/// Runs all pending migrations for the storage's backend.
///
/// ## Safety
/// - Idempotent: safe to run multiple times
/// - Ordered: migrations run in filename order (0001, 0002, ...)
pub async fn run_migrations(storage: &Storage) -> DbResult<()> {
    let migrator = migrator(storage.backend());
    info!(
        backend = %storage.backend(),
        embedded = migrator.migrations.len(),
        "Checking for pending migrations"
    );

    migrator.run(storage.pool()).await?;

    info!("All migrations applied successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_backends_ship_the_same_versions() {
        let versions = |m: &Migrator| m.iter().map(|x| x.version).collect::<Vec<_>>();
        assert_eq!(versions(&SQLITE_MIGRATOR), versions(&POSTGRES_MIGRATOR));
        assert!(!SQLITE_MIGRATOR.migrations.is_empty());
    }
}
