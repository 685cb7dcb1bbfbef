//! Entry repository implementation
//!
//! Entries are written once, in batches, inside the database transaction that
//! commits their ledger transaction. They are never updated.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction as DbTransaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use ledger_kernel::{AccountId, Entry, ReadEntryFilter, TransactionId};

use crate::codec::{decode_all, EntryRow};
use crate::error::DatabaseError;
use crate::query::{Predicate, SelectQuery, Table};

/// Rows per INSERT statement; 8 binds each stays well below the protocol limit
const INSERT_CHUNK: usize = 1_000;

/// Repository for entry rows
#[derive(Debug, Clone)]
pub struct EntryRepository {
    pool: PgPool,
}

impl EntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts `entries` inside an open database transaction
    ///
    /// Any failing row aborts the batch. An empty slice issues no statement.
    #[instrument(skip(self, tx, entries), fields(count = entries.len()), err)]
    pub async fn insert_all_in(
        &self,
        tx: &mut DbTransaction<'_, Postgres>,
        entries: &[Entry],
    ) -> Result<(), DatabaseError> {
        for chunk in entries.chunks(INSERT_CHUNK) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO entries (id, transaction_id, account_id, entry_side, account_side, amount, currency, created_at) ",
            );
            builder.push_values(chunk.iter().map(EntryRow::from), |mut b, row| {
                b.push_bind(row.id)
                    .push_bind(row.transaction_id)
                    .push_bind(row.account_id)
                    .push_bind(row.entry_side)
                    .push_bind(row.account_side)
                    .push_bind(row.amount)
                    .push_bind(row.currency)
                    .push_bind(row.created_at);
            });

            let inserted = builder.build().execute(&mut **tx).await?.rows_affected();
            if inserted != chunk.len() as u64 {
                return Err(DatabaseError::ConsistencyViolation(format!(
                    "inserted {} of {} entries",
                    inserted,
                    chunk.len()
                )));
            }
        }

        debug!("Entries inserted");
        Ok(())
    }

    /// Retrieves the entries matching `filter`, newest first
    #[instrument(skip(self, filter), err)]
    pub async fn find(&self, filter: &ReadEntryFilter) -> Result<Vec<Entry>, DatabaseError> {
        self.fetch(SelectQuery::entries(filter)).await
    }

    /// Retrieves every entry posted to an account, newest first
    #[instrument(skip(self), fields(account_id = %account_id), err)]
    pub async fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Entry>, DatabaseError> {
        self.fetch(SelectQuery::new(Table::Entries).and(Predicate::UuidIn {
            column: "account_id",
            ids: vec![account_id.into()],
        }))
        .await
    }

    /// Retrieves the entries of one transaction in the order they were added
    #[instrument(skip(self), fields(transaction_id = %transaction_id), err)]
    pub async fn find_by_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Vec<Entry>, DatabaseError> {
        self.fetch(
            SelectQuery::new(Table::Entries)
                .and(Predicate::UuidIn {
                    column: "transaction_id",
                    ids: vec![transaction_id.into()],
                })
                .oldest_first(),
        )
        .await
    }

    /// Retrieves the entries of several transactions with one query, grouped
    /// by transaction id
    #[instrument(skip(self, transaction_ids), fields(count = transaction_ids.len()), err)]
    pub async fn find_grouped_by_transaction(
        &self,
        transaction_ids: Vec<Uuid>,
    ) -> Result<HashMap<TransactionId, Vec<Entry>>, DatabaseError> {
        let mut grouped: HashMap<TransactionId, Vec<Entry>> = HashMap::new();
        if transaction_ids.is_empty() {
            return Ok(grouped);
        }

        let entries = self
            .fetch(
                SelectQuery::new(Table::Entries)
                    .and(Predicate::UuidIn {
                        column: "transaction_id",
                        ids: transaction_ids,
                    })
                    .oldest_first(),
            )
            .await?;

        for entry in entries {
            grouped.entry(entry.transaction_id).or_default().push(entry);
        }
        Ok(grouped)
    }

    async fn fetch(&self, query: SelectQuery) -> Result<Vec<Entry>, DatabaseError> {
        let mut builder = query.into_builder();
        let rows = builder
            .build_query_as::<EntryRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Entries fetched");
        decode_all(rows)
    }
}
