//! Database error types
//!
//! This module defines the errors ledger storage can produce. PostgreSQL
//! constraint failures are mapped to specific variants so callers can tell a
//! duplicate external id from a lost connection.

use ledger_kernel::StoreError;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Entity not found, or a version-checked write matched no row
    #[error("{entity} with id '{id}' not found")]
    NotFound {
        entity: String,
        id: String,
    },

    /// Unique constraint violation on id or external id
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A stored amount is not a base-10 integer
    #[error("Malformed amount: {0:?}")]
    MalformedAmount(String),

    /// A structurally guaranteed invariant did not hold
    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Transport or driver error surfaced as-is
    #[error("SQL error: {0}")]
    Sql(#[source] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use ledger_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Account", "ext-1");
    /// assert!(error.to_string().contains("Account"));
    /// assert!(error.is_not_found());
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Creates the error returned when a version-checked write matched no row
    pub fn stale_version(entity: &str, id: impl std::fmt::Display, version: i64) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: format!("{} at version {}", id, version),
        }
    }

    /// Creates the error returned when a single-row write touched `affected` rows
    pub fn unexpected_rows(entity: &str, id: impl std::fmt::Display, affected: usize) -> Self {
        DatabaseError::ConsistencyViolation(format!(
            "expected exactly one {} row with id '{}' to change, {} changed",
            entity, id, affected
        ))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Checks if this error is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, DatabaseError::Conflict(_))
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        ) || matches!(self, DatabaseError::Sql(e) if matches!(e, sqlx::Error::Io(_) | sqlx::Error::PoolClosed))
    }
}

/// Converts SQLx errors to specific DatabaseError variants
///
/// Constraint failures are classified by PostgreSQL error code; everything
/// else is kept intact in `Sql` so transport failures surface unchanged.
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::not_found("Record", "unknown"),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let code = db_err.code().map(|c| c.into_owned());
                match code.as_deref() {
                    Some("23505") => DatabaseError::Conflict(db_err.message().to_string()),
                    Some("23503") => DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                    Some("23514") => DatabaseError::ConstraintViolation(db_err.message().to_string()),
                    _ => DatabaseError::Sql(sqlx::Error::Database(db_err)),
                }
            }
            other => DatabaseError::Sql(other),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        DatabaseError::SerializationError(error.to_string())
    }
}

/// Translates database errors into storage port errors
///
/// - `NotFound` -> `StoreError::NotFound`
/// - `Conflict` -> `StoreError::Conflict`
/// - `MalformedAmount` -> `StoreError::MalformedAmount`
/// - `ConsistencyViolation` -> `StoreError::ConsistencyViolation`
/// - Other errors -> `StoreError::Storage` with the original as source
impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => StoreError::NotFound {
                entity_type: entity,
                id,
            },
            DatabaseError::Conflict(message) => StoreError::Conflict { message },
            DatabaseError::MalformedAmount(value) => StoreError::MalformedAmount { value },
            DatabaseError::ConsistencyViolation(message) => StoreError::ConsistencyViolation { message },
            other => StoreError::Storage {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_pool_timeout_is_connection_error() {
        let err = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DatabaseError::PoolExhausted));
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_port_translation_keeps_taxonomy() {
        let err: StoreError = DatabaseError::stale_version("Account", "ACC-1", 7).into();
        assert!(err.is_not_found());

        let err: StoreError = DatabaseError::Conflict("external_id".into()).into();
        assert!(err.is_conflict());

        let err: StoreError = DatabaseError::unexpected_rows("Account", "ACC-1", 2).into();
        assert!(err.is_fatal());

        let err: StoreError = DatabaseError::PoolExhausted.into();
        assert!(matches!(err, StoreError::Storage { source: Some(_), .. }));
    }
}
