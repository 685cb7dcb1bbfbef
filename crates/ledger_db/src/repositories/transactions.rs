//! Transaction repository implementation
//!
//! A ledger transaction is committed together with its entries and the new
//! balances of every account it touches, in one database transaction:
//!
//! 1. insert the transaction row
//! 2. batch-insert the entries
//! 3. version-checked balance update of each account, in the caller's order
//! 4. commit
//!
//! Any error returns before step 4. The open `sqlx::Transaction` is then
//! dropped, which rolls the whole unit back; the same happens when the
//! caller drops the future mid-commit.

use sqlx::PgPool;
use tracing::{debug, info, instrument};

use ledger_kernel::{Account, ReadTransactionFilter, Transaction, TransactionId, Version};

use crate::codec::TransactionRow;
use crate::error::DatabaseError;
use crate::query::{SelectQuery, TRANSACTION_COLUMNS};
use crate::repositories::accounts::AccountRepository;
use crate::repositories::entries::EntryRepository;

/// Repository for ledger transactions and their atomic commit
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: PgPool,
    accounts: AccountRepository,
    entries: EntryRepository,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            entries: EntryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Atomically stores `transaction`, its entries and the balances of
    /// `accounts`
    ///
    /// # Returns
    ///
    /// The new version of each account, in the order given
    ///
    /// # Errors
    ///
    /// - `DatabaseError::Conflict` if the transaction id or external id exists
    /// - `DatabaseError::NotFound` if any account is missing or stale
    /// - `DatabaseError::ConsistencyViolation` if an entry names another
    ///   transaction or a write touched an unexpected number of rows
    #[instrument(
        skip(self, transaction, accounts),
        fields(
            transaction_id = %transaction.id,
            entries = transaction.entries.len(),
            accounts = accounts.len()
        ),
        err
    )]
    pub async fn commit(
        &self,
        transaction: &Transaction,
        accounts: &[Account],
    ) -> Result<Vec<Version>, DatabaseError> {
        if let Some(stray) = transaction
            .entries
            .iter()
            .find(|entry| entry.transaction_id != transaction.id)
        {
            return Err(DatabaseError::ConsistencyViolation(format!(
                "entry {} belongs to {}, not {}",
                stray.id, stray.transaction_id, transaction.id
            )));
        }

        let row = TransactionRow::from(transaction);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, external_id, description, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(row.id)
        .bind(row.external_id)
        .bind(row.description)
        .bind(row.metadata)
        .bind(row.created_at)
        .execute(&mut *tx)
        .await?;

        self.entries.insert_all_in(&mut tx, &transaction.entries).await?;

        let mut versions = Vec::with_capacity(accounts.len());
        for account in accounts {
            versions.push(self.accounts.update_balance_in(&mut tx, account).await?);
        }

        tx.commit().await?;

        info!("Transaction committed");
        Ok(versions)
    }

    /// Retrieves a transaction with its entries
    #[instrument(skip(self), fields(transaction_id = %id), err)]
    pub async fn get_by_id(&self, id: TransactionId) -> Result<Transaction, DatabaseError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE id = $1",
            TRANSACTION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Transaction", id))?;

        let entries = self.entries.find_by_transaction(id).await?;
        Ok(row.into_transaction(entries))
    }

    /// Retrieves a transaction with its entries by external id
    #[instrument(skip(self), err)]
    pub async fn get_by_external_id(&self, external_id: &str) -> Result<Transaction, DatabaseError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE external_id = $1",
            TRANSACTION_COLUMNS
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Transaction", external_id))?;

        let entries = self.entries.find_by_transaction(row.id.into()).await?;
        Ok(row.into_transaction(entries))
    }

    /// Retrieves the transactions matching `filter` with their entries,
    /// newest first
    #[instrument(skip(self, filter), err)]
    pub async fn find(&self, filter: &ReadTransactionFilter) -> Result<Vec<Transaction>, DatabaseError> {
        let mut builder = SelectQuery::transactions(filter).into_builder();
        let rows = builder
            .build_query_as::<TransactionRow>()
            .fetch_all(&self.pool)
            .await?;

        let ids = rows.iter().map(|row| row.id).collect();
        let mut entries = self.entries.find_grouped_by_transaction(ids).await?;

        debug!(count = rows.len(), "Transactions fetched");
        Ok(rows
            .into_iter()
            .map(|row| {
                let own = entries.remove(&TransactionId::from(row.id)).unwrap_or_default();
                row.into_transaction(own)
            })
            .collect())
    }
}
