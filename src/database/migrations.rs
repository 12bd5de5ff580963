/// Schema migration runner
///
/// Makes sure version tracking exists, upgrades the schema to the newest
/// embedded migration and checks for drift between the embedded migrations
/// and what the database has applied.
///
/// Initialization failures are fatal. Anything that goes wrong after
/// initialization is logged and reported, never raised.

use crate::{
    database::store::sqlite_options,
    error::{StudioError, StudioResult},
};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{
    migrate::{Migrate, MigrateError, Migrator},
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use std::{collections::HashMap, time::Duration};

/// Migrations embedded from `./migrations`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Name of the version-tracking table maintained by sqlx
pub const VERSION_TABLE: &str = "_sqlx_migrations";

/// Outcome of comparing embedded migrations with the applied ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftStatus {
    InSync,
    /// Embedded migrations not yet applied
    Behind { pending: Vec<i64> },
    /// Applied migrations whose checksum changed or that are unknown to this build
    Diverged { versions: Vec<i64> },
    /// A migration was interrupted half-way
    Dirty { version: i64 },
}

impl DriftStatus {
    pub fn is_in_sync(&self) -> bool {
        matches!(self, DriftStatus::InSync)
    }
}

/// The migration tool seam
#[async_trait]
pub trait SchemaMigrator: Send {
    async fn has_version_table(&mut self) -> Result<bool, MigrateError>;
    async fn ensure_version_table(&mut self) -> Result<(), MigrateError>;
    /// Apply every pending migration, returning how many were applied
    async fn upgrade_to_head(&mut self) -> Result<usize, MigrateError>;
    async fn check_for_drift(&mut self) -> Result<DriftStatus, MigrateError>;
}

/// [`SchemaMigrator`] backed by sqlx's embedded migrator
pub struct SqlxMigrator {
    pool: SqlitePool,
    migrator: &'static Migrator,
}

impl SqlxMigrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_migrator(pool, &MIGRATOR)
    }

    pub fn with_migrator(pool: SqlitePool, migrator: &'static Migrator) -> Self {
        Self { pool, migrator }
    }

    async fn applied_count(&self) -> Result<usize, MigrateError> {
        let mut conn = self.pool.acquire().await?;
        Ok(conn.list_applied_migrations().await?.len())
    }
}

#[async_trait]
impl SchemaMigrator for SqlxMigrator {
    async fn has_version_table(&mut self) -> Result<bool, MigrateError> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(VERSION_TABLE)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn ensure_version_table(&mut self) -> Result<(), MigrateError> {
        let mut conn = self.pool.acquire().await?;
        conn.ensure_migrations_table().await
    }

    async fn upgrade_to_head(&mut self) -> Result<usize, MigrateError> {
        let before = self.applied_count().await?;
        self.migrator.run(&self.pool).await?;
        let after = self.applied_count().await?;
        Ok(after.saturating_sub(before))
    }

    async fn check_for_drift(&mut self) -> Result<DriftStatus, MigrateError> {
        let mut conn = self.pool.acquire().await?;
        if let Some(version) = conn.dirty_version().await? {
            return Ok(DriftStatus::Dirty { version });
        }

        let applied: HashMap<i64, Vec<u8>> = conn
            .list_applied_migrations()
            .await?
            .into_iter()
            .map(|m| (m.version, m.checksum.into_owned()))
            .collect();

        let mut pending = Vec::new();
        let mut diverged = Vec::new();
        for migration in self
            .migrator
            .iter()
            .filter(|m| !m.migration_type.is_down_migration())
        {
            match applied.get(&migration.version) {
                None => pending.push(migration.version),
                Some(checksum) if checksum.as_slice() != migration.checksum.as_ref() => {
                    diverged.push(migration.version)
                }
                Some(_) => {}
            }
        }
        let known: Vec<i64> = self.migrator.iter().map(|m| m.version).collect();
        let mut unknown: Vec<i64> = applied.keys().filter(|v| !known.contains(v)).copied().collect();
        unknown.sort_unstable();
        diverged.extend(unknown);

        if !diverged.is_empty() {
            Ok(DriftStatus::Diverged { versions: diverged })
        } else if !pending.is_empty() {
            Ok(DriftStatus::Behind { pending })
        } else {
            Ok(DriftStatus::InSync)
        }
    }
}

/// What a migration pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Version tracking was created during this pass
    pub initialized: bool,
    /// Upgrade commands issued
    pub upgrade_commands: usize,
    /// Migrations applied across all upgrade commands
    pub upgrades_applied: usize,
    /// Drift after the final check, `None` when the check itself failed
    pub final_drift: Option<DriftStatus>,
}

/// Drives a [`SchemaMigrator`] through initialization, upgrade and drift checks
pub struct MigrationRunner<M> {
    migrator: M,
    settle_delay: Duration,
}

impl<M: SchemaMigrator> MigrationRunner<M> {
    pub fn new(migrator: M, settle_delay: Duration) -> Self {
        Self {
            migrator,
            settle_delay,
        }
    }

    pub fn into_inner(self) -> M {
        self.migrator
    }

    pub async fn run(&mut self) -> StudioResult<MigrationReport> {
        let mut report = MigrationReport {
            initialized: false,
            upgrade_commands: 0,
            upgrades_applied: 0,
            final_drift: None,
        };

        // A failing probe is treated like a missing table, initialization decides
        let initialized = match self.migrator.has_version_table().await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("⚠️ Could not probe for {}: {}", VERSION_TABLE, e);
                false
            }
        };

        if initialized {
            tracing::info!("✅ Migration tracking already initialized");
        } else {
            tracing::info!("🏗️ Initializing migration tracking");
            self.migrator
                .ensure_version_table()
                .await
                .map_err(StudioError::MigrationInit)?;
            report.upgrade_commands += 1;
            let applied = self
                .migrator
                .upgrade_to_head()
                .await
                .map_err(|e| {
                    tracing::error!("❌ Error initializing migrations: {}", e);
                    StudioError::MigrationInit(e)
                })?;
            report.upgrades_applied += applied;
            report.initialized = true;
            tracing::info!("✅ Migration tracking initialized ({} migrations applied)", applied);
        }

        tracing::info!("🔍 Checking for schema drift");
        let needs_upgrade = match self.migrator.check_for_drift().await {
            Ok(DriftStatus::InSync) => false,
            Ok(drift) => {
                tracing::info!("🔧 Schema drift detected: {:?}", drift);
                true
            }
            Err(e) => {
                tracing::warn!("⚠️ Drift check failed: {}", e);
                true
            }
        };

        if needs_upgrade {
            report.upgrade_commands += 1;
            match self.migrator.upgrade_to_head().await {
                Ok(applied) => {
                    report.upgrades_applied += applied;
                    tokio::time::sleep(self.settle_delay).await;
                }
                Err(e) => tracing::error!("❌ Error running migrations: {}", e),
            }
        }

        match self.migrator.check_for_drift().await {
            Ok(DriftStatus::InSync) => {
                tracing::info!("✅ Schema is up to date");
                report.final_drift = Some(DriftStatus::InSync);
            }
            Ok(drift) => {
                tracing::warn!("⚠️ Schema drift persists after upgrade: {:?}", drift);
                report.final_drift = Some(drift);
            }
            Err(e) => {
                tracing::error!("❌ Migration check failed: {}", e);
            }
        }

        Ok(report)
    }
}

/// Run migrations against the database at `connection_uri`
///
/// Safe to call on every process start.
pub async fn run_migrations(
    connection_uri: &str,
    settle_delay: Duration,
) -> StudioResult<MigrationReport> {
    tracing::info!("🗄️ Running migrations with database: {}", connection_uri);
    let options = sqlite_options(connection_uri)?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| StudioError::MigrationInit(MigrateError::Execute(e)))?;

    let mut runner = MigrationRunner::new(SqlxMigrator::new(pool.clone()), settle_delay);
    let report = runner.run().await;
    pool.close().await;
    report
}
