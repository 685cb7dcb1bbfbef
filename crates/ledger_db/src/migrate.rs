//! Schema provisioning
//!
//! The ledger schema ships as versioned SQL migrations embedded in the
//! binary. Provisioning is idempotent: running it again at the same target
//! reports [`ProvisionOutcome::NoChange`]. Downgrades are refused, and a
//! dirty schema blocks provisioning until [`SchemaProvisioner::force_clean`]
//! clears it.

use sqlx::migrate::{Migrate, Migrator};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::error::DatabaseError;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Schema version to provision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionTarget {
    /// Every embedded migration
    Latest,
    /// Migrations up to and including this version
    Version(i64),
}

/// Result of a provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The schema was already at the target
    NoChange,
    /// These versions were applied, in order
    Applied { versions: Vec<i64> },
}

/// Applies the embedded migrations to a database
#[derive(Debug, Clone)]
pub struct SchemaProvisioner {
    pool: PgPool,
}

/// Versions of every embedded up-migration, ascending
pub fn known_versions() -> Vec<i64> {
    MIGRATOR
        .iter()
        .filter(|migration| !migration.migration_type.is_down_migration())
        .map(|migration| migration.version)
        .collect()
}

/// Works out which versions to apply to reach `target`
///
/// # Errors
///
/// `DatabaseError::MigrationFailed` if the target is unknown or lies below a
/// version that is already applied
pub fn plan(known: &[i64], applied: &[i64], target: ProvisionTarget) -> Result<Vec<i64>, DatabaseError> {
    let target = match target {
        ProvisionTarget::Latest => match known.iter().max() {
            Some(latest) => *latest,
            None => return Ok(Vec::new()),
        },
        ProvisionTarget::Version(version) if known.contains(&version) => version,
        ProvisionTarget::Version(version) => {
            return Err(DatabaseError::MigrationFailed(format!(
                "unknown schema version {}",
                version
            )))
        }
    };

    if let Some(current) = applied.iter().copied().filter(|v| *v > target).max() {
        return Err(DatabaseError::MigrationFailed(format!(
            "schema is at version {}, refusing to downgrade to {}",
            current, target
        )));
    }

    let mut pending: Vec<i64> = known
        .iter()
        .copied()
        .filter(|version| *version <= target && !applied.contains(version))
        .collect();
    pending.sort_unstable();
    Ok(pending)
}

impl SchemaProvisioner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Brings the schema to `target`
    ///
    /// Holds the migration advisory lock for the duration of the run so
    /// concurrent provisioners serialize.
    #[instrument(skip(self), err)]
    pub async fn provision(&self, target: ProvisionTarget) -> Result<ProvisionOutcome, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        conn.ensure_migrations_table().await?;
        conn.lock().await?;
        let outcome = Self::apply(&mut conn, target).await;
        conn.unlock().await?;

        match &outcome {
            Ok(ProvisionOutcome::NoChange) => info!("Schema already up to date"),
            Ok(ProvisionOutcome::Applied { versions }) => info!(?versions, "Schema migrations applied"),
            Err(e) => warn!(error = %e, "Schema provisioning failed"),
        }
        outcome
    }

    async fn apply(
        conn: &mut sqlx::PgConnection,
        target: ProvisionTarget,
    ) -> Result<ProvisionOutcome, DatabaseError> {
        if let Some(version) = conn.dirty_version().await? {
            return Err(DatabaseError::MigrationFailed(format!(
                "schema version {} was left partially applied",
                version
            )));
        }

        let applied = conn.list_applied_migrations().await?;
        for existing in &applied {
            let embedded = MIGRATOR
                .iter()
                .find(|migration| migration.version == existing.version);
            if let Some(migration) = embedded {
                if migration.checksum != existing.checksum {
                    return Err(sqlx::migrate::MigrateError::VersionMismatch(existing.version).into());
                }
            }
        }

        let applied_versions: Vec<i64> = applied.iter().map(|migration| migration.version).collect();
        let pending = plan(&known_versions(), &applied_versions, target)?;
        if pending.is_empty() {
            return Ok(ProvisionOutcome::NoChange);
        }

        for migration in MIGRATOR
            .iter()
            .filter(|migration| !migration.migration_type.is_down_migration())
            .filter(|migration| pending.contains(&migration.version))
        {
            info!(version = migration.version, description = %migration.description, "Applying migration");
            conn.apply(migration).await?;
        }

        Ok(ProvisionOutcome::Applied { versions: pending })
    }

    /// Forgets a partially applied migration so the next run retries it
    ///
    /// A migration that failed halfway leaves the schema dirty and every
    /// later [`provision`](Self::provision) call fails until the schema is
    /// repaired by hand and this is called with the dirty version. Returns
    /// `false` when that version was not dirty.
    #[instrument(skip(self), err)]
    pub async fn force_clean(&self, version: i64) -> Result<bool, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        conn.ensure_migrations_table().await?;
        conn.lock().await?;
        let removed = sqlx::query("DELETE FROM _sqlx_migrations WHERE version = $1 AND NOT success")
            .bind(version)
            .execute(&mut *conn)
            .await
            .map(|result| result.rows_affected() > 0);
        conn.unlock().await?;

        let removed = removed?;
        if removed {
            warn!(version, "Cleared dirty schema version");
        }
        Ok(removed)
    }

    /// Highest applied schema version, `None` on an empty database
    #[instrument(skip(self), err)]
    pub async fn current_version(&self) -> Result<Option<i64>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        conn.ensure_migrations_table().await?;
        let applied = conn.list_applied_migrations().await?;
        Ok(applied.iter().map(|migration| migration.version).max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_schema_is_present() {
        assert_eq!(known_versions(), vec![20240101000001]);
    }

    #[test]
    fn test_plan_latest_on_empty_database() {
        let pending = plan(&[1, 2, 3], &[], ProvisionTarget::Latest).unwrap();
        assert_eq!(pending, vec![1, 2, 3]);
    }

    #[test]
    fn test_plan_is_empty_when_up_to_date() {
        assert!(plan(&[1, 2], &[1, 2], ProvisionTarget::Latest).unwrap().is_empty());
        assert!(plan(&[1, 2], &[1], ProvisionTarget::Version(1)).unwrap().is_empty());
    }

    #[test]
    fn test_plan_stops_at_target_version() {
        let pending = plan(&[1, 2, 3], &[1], ProvisionTarget::Version(2)).unwrap();
        assert_eq!(pending, vec![2]);
    }

    #[test]
    fn test_plan_refuses_downgrade() {
        let err = plan(&[1, 2, 3], &[1, 2, 3], ProvisionTarget::Version(1)).unwrap_err();
        assert!(matches!(err, DatabaseError::MigrationFailed(ref m) if m.contains("downgrade")));
    }

    #[test]
    fn test_plan_rejects_unknown_version() {
        assert!(plan(&[1], &[], ProvisionTarget::Version(9)).is_err());
    }
}
