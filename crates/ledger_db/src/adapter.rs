//! PostgreSQL Ledger Adapter
//!
//! Implements the kernel's `LedgerReadWriter` port on top of the account,
//! transaction and entry repositories.
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_db::{create_pool, DatabaseConfig, PostgresLedger};
//! use ledger_kernel::LedgerReadWriter;
//! use std::sync::Arc;
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! let store: Arc<dyn LedgerReadWriter> = Arc::new(PostgresLedger::new(pool));
//! let account = store.read_account_by_external_id("cash").await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use ledger_kernel::{
    Account, AccountId, AdapterHealth, Entry, HealthCheckResult, HealthCheckable,
    LedgerReadWriter, ReadAccountFilter, ReadEntryFilter, ReadTransactionFilter, StoreError,
    Transaction, TransactionId, Version,
};

use crate::repositories::{AccountRepository, EntryRepository, TransactionRepository};

const ADAPTER_ID: &str = "postgres-ledger-adapter";

/// PostgreSQL-backed implementation of `LedgerReadWriter`
///
/// # Error Handling
///
/// Database errors are translated to `StoreError` variants:
/// - `DatabaseError::NotFound` -> `StoreError::NotFound`
/// - `DatabaseError::Conflict` -> `StoreError::Conflict`
/// - `DatabaseError::MalformedAmount` -> `StoreError::MalformedAmount`
/// - `DatabaseError::ConsistencyViolation` -> `StoreError::ConsistencyViolation`
/// - Other errors -> `StoreError::Storage`
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    accounts: AccountRepository,
    transactions: TransactionRepository,
    entries: EntryRepository,
    pool: PgPool,
}

impl PostgresLedger {
    /// Creates a new adapter over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            entries: EntryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the account repository
    pub fn accounts(&self) -> &AccountRepository {
        &self.accounts
    }

    /// Returns the transaction repository
    pub fn transactions(&self) -> &TransactionRepository {
        &self.transactions
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HealthCheckable for PostgresLedger {
    /// Checks database connectivity with `SELECT 1`
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LedgerReadWriter for PostgresLedger {
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn write_account(&self, account: &Account, allow_update: bool) -> Result<Version, StoreError> {
        debug!("Writing account");

        let version = if allow_update {
            self.accounts.upsert_versioned(account).await?
        } else {
            self.accounts.insert(account).await?
        };
        Ok(version)
    }

    #[instrument(skip(self, transaction, accounts), fields(transaction_id = %transaction.id))]
    async fn write_transaction(
        &self,
        transaction: &Transaction,
        accounts: &[Account],
    ) -> Result<Vec<Version>, StoreError> {
        debug!("Writing transaction");
        Ok(self.transactions.commit(transaction, accounts).await?)
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn read_account(&self, id: AccountId) -> Result<Account, StoreError> {
        Ok(self.accounts.get_by_id(id).await?)
    }

    #[instrument(skip(self))]
    async fn read_account_by_external_id(&self, external_id: &str) -> Result<Account, StoreError> {
        Ok(self.accounts.get_by_external_id(external_id).await?)
    }

    #[instrument(skip(self))]
    async fn read_accounts(&self, filter: &ReadAccountFilter) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts.find(filter).await?)
    }

    #[instrument(skip(self), fields(transaction_id = %id))]
    async fn read_transaction(&self, id: TransactionId) -> Result<Transaction, StoreError> {
        Ok(self.transactions.get_by_id(id).await?)
    }

    #[instrument(skip(self))]
    async fn read_transaction_by_external_id(&self, external_id: &str) -> Result<Transaction, StoreError> {
        Ok(self.transactions.get_by_external_id(external_id).await?)
    }

    #[instrument(skip(self))]
    async fn read_transactions(&self, filter: &ReadTransactionFilter) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.transactions.find(filter).await?)
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn read_entries_of_account(&self, id: AccountId) -> Result<Vec<Entry>, StoreError> {
        Ok(self.entries.find_by_account(id).await?)
    }

    #[instrument(skip(self))]
    async fn read_entries(&self, filter: &ReadEntryFilter) -> Result<Vec<Entry>, StoreError> {
        Ok(self.entries.find(filter).await?)
    }

    #[instrument(skip(self), fields(transaction_id = %id))]
    async fn read_entries_of_transaction(&self, id: TransactionId) -> Result<Vec<Entry>, StoreError> {
        Ok(self.entries.find_by_transaction(id).await?)
    }
}
