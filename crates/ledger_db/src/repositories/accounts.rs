//! Account repository implementation
//!
//! Every statement that changes an existing account row carries a
//! `version = $expected` predicate and bumps the version by one. The only
//! unconditioned write is the first insert, which fails on a duplicate id or
//! external id.

use sqlx::{PgPool, Postgres, Transaction as DbTransaction};
use tracing::{debug, instrument, warn};

use ledger_kernel::{Account, AccountId, ReadAccountFilter, Version, INITIAL_VERSION};

use crate::codec::{decode_all, encode_balance, AccountRow};
use crate::error::DatabaseError;
use crate::query::{SelectQuery, ACCOUNT_COLUMNS};

/// Repository for account rows
///
/// # Example
///
/// ```rust,ignore
/// use ledger_db::repositories::AccountRepository;
///
/// let repo = AccountRepository::new(pool);
/// let version = repo.insert(&account).await?;
/// account.version = version;
/// account.name = "Renamed".into();
/// let version = repo.upsert_versioned(&account).await?;
/// ```
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

/// Collapses the versions returned by a single-row write
fn single_version(
    versions: Vec<Version>,
    id: AccountId,
    expected: Version,
) -> Result<Version, DatabaseError> {
    match versions.as_slice() {
        [version] => Ok(*version),
        [] => Err(DatabaseError::stale_version("Account", id, expected)),
        more => Err(DatabaseError::unexpected_rows("Account", id, more.len())),
    }
}

impl AccountRepository {
    /// Creates a new AccountRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new account at the initial version
    ///
    /// The caller's `version` field is ignored.
    ///
    /// # Errors
    ///
    /// `DatabaseError::Conflict` if the id or external id is already taken
    #[instrument(skip(self, account), fields(account_id = %account.id, external_id = %account.external_id), err)]
    pub async fn insert(&self, account: &Account) -> Result<Version, DatabaseError> {
        let row = AccountRow::from(account);

        let version = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO accounts (
                id, external_id, name, normal_side, balance, metadata,
                version, created_at, updated_at, deleted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING version
            "#,
        )
        .bind(row.id)
        .bind(row.external_id)
        .bind(row.name)
        .bind(row.normal_side)
        .bind(row.balance)
        .bind(row.metadata)
        .bind(INITIAL_VERSION)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.deleted_at)
        .fetch_one(&self.pool)
        .await?;

        debug!(version, "Account inserted");
        Ok(version)
    }

    /// Inserts the account, or overwrites it if the stored version still
    /// equals `account.version`
    ///
    /// The update branch rewrites name, metadata, balance, `updated_at` and
    /// `deleted_at`. Identity, normal side and creation time are kept.
    ///
    /// # Returns
    ///
    /// `INITIAL_VERSION` for a fresh row, otherwise the stored version plus one
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` if the row exists at another version
    /// - `DatabaseError::Conflict` if the external id belongs to another account
    #[instrument(
        skip(self, account),
        fields(account_id = %account.id, expected_version = account.version),
        err
    )]
    pub async fn upsert_versioned(&self, account: &Account) -> Result<Version, DatabaseError> {
        let row = AccountRow::from(account);

        let versions = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO accounts (
                id, external_id, name, normal_side, balance, metadata,
                version, created_at, updated_at, deleted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                metadata = EXCLUDED.metadata,
                balance = EXCLUDED.balance,
                updated_at = EXCLUDED.updated_at,
                deleted_at = EXCLUDED.deleted_at,
                version = accounts.version + 1
            WHERE accounts.version = $11
            RETURNING version
            "#,
        )
        .bind(row.id)
        .bind(row.external_id)
        .bind(row.name)
        .bind(row.normal_side)
        .bind(row.balance)
        .bind(row.metadata)
        .bind(INITIAL_VERSION)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.deleted_at)
        .bind(account.version)
        .fetch_all(&self.pool)
        .await?;

        let version = single_version(versions, account.id, account.version);
        if let Err(DatabaseError::NotFound { .. }) = &version {
            warn!("Stale account version, upsert rejected");
        }
        version
    }

    /// Writes a pre-computed balance inside an open database transaction
    ///
    /// Conditioned on the stored version equal to `account.version`.
    #[instrument(
        skip(self, tx, account),
        fields(account_id = %account.id, expected_version = account.version),
        err
    )]
    pub async fn update_balance_in(
        &self,
        tx: &mut DbTransaction<'_, Postgres>,
        account: &Account,
    ) -> Result<Version, DatabaseError> {
        let versions = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE accounts
            SET balance = $2,
                updated_at = $3,
                version = version + 1
            WHERE id = $1 AND version = $4
            RETURNING version
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(encode_balance(account.balance.as_ref()))
        .bind(account.updated_at)
        .bind(account.version)
        .fetch_all(&mut **tx)
        .await?;

        single_version(versions, account.id, account.version)
    }

    /// Retrieves an account by id
    #[instrument(skip(self), fields(account_id = %id), err)]
    pub async fn get_by_id(&self, id: AccountId) -> Result<Account, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Account", id))?;

        Account::try_from(row)
    }

    /// Retrieves an account by its external id
    #[instrument(skip(self), err)]
    pub async fn get_by_external_id(&self, external_id: &str) -> Result<Account, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE external_id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Account", external_id))?;

        Account::try_from(row)
    }

    /// Retrieves the accounts matching `filter`, newest first
    #[instrument(skip(self, filter), err)]
    pub async fn find(&self, filter: &ReadAccountFilter) -> Result<Vec<Account>, DatabaseError> {
        let mut builder = SelectQuery::accounts(filter).into_builder();
        let rows = builder
            .build_query_as::<AccountRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Accounts fetched");
        decode_all(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_version_classifies_row_counts() {
        let id = AccountId::new();

        assert_eq!(single_version(vec![3], id, 2).unwrap(), 3);

        let err = single_version(vec![], id, 2).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("at version 2"));

        let err = single_version(vec![3, 3], id, 2).unwrap_err();
        assert!(matches!(err, DatabaseError::ConsistencyViolation(_)));
    }
}
