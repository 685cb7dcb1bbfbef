//! Storage port consumed by the ledger engine
//!
//! The ledger engine decides what a transaction means and computes the new
//! balances; a `LedgerReadWriter` only persists those pre-computed values and
//! refuses to overwrite an account version it has not been shown.
//!
//! ```rust,ignore
//! let store: Arc<dyn LedgerReadWriter> = Arc::new(PostgresLedger::new(pool));
//!
//! let version = store.write_account(&account, false).await?;
//! let versions = store.write_transaction(&deposit, &[debit, credit]).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::account::{Account, Version};
use crate::filter::{ReadAccountFilter, ReadEntryFilter, ReadTransactionFilter};
use crate::identifiers::{AccountId, TransactionId};
use crate::transaction::{Entry, Transaction};

/// Error type for storage port operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// A single-entity lookup matched nothing, or a version-checked write
    /// matched no row (stale version or deleted row)
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// A uniqueness constraint (id or external id) was violated
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// A stored amount could not be decoded as an integer
    #[error("Malformed amount: {value:?}")]
    MalformedAmount {
        value: String,
    },

    /// A structurally guaranteed invariant did not hold
    #[error("Consistency violation: {message}")]
    ConsistencyViolation {
        message: String,
    },

    /// Transport, connectivity or other storage failure, surfaced as-is
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        StoreError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        StoreError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        StoreError::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates the entity was not found
    ///
    /// After a versioned write this also means the caller's version is stale;
    /// re-read the account to tell the two apart.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns true if a uniqueness constraint rejected the write
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Returns true if the error signals a bug and must not be retried
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::ConsistencyViolation { .. } | StoreError::MalformedAmount { .. }
        )
    }
}

/// Health status of a storage adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Unhealthy,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    pub status: AdapterHealth,
    /// Round-trip latency of the probe in milliseconds
    pub latency_ms: u64,
    /// Failure detail when unhealthy
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn is_healthy(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

/// Trait for adapters that support health checks
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

/// Persistence port for ledger state
///
/// Every method may block on I/O. Dropping a returned future cancels the
/// operation; implementations must leave no partial write behind when that
/// happens.
#[async_trait]
pub trait LedgerReadWriter: Send + Sync {
    /// Stores an account
    ///
    /// With `allow_update == false` the account must not exist yet
    /// (`Conflict` otherwise). With `allow_update == true` an existing row is
    /// only overwritten if its stored version equals `account.version`
    /// (`NotFound` otherwise).
    ///
    /// # Returns
    ///
    /// The version now stored for the account
    async fn write_account(&self, account: &Account, allow_update: bool) -> Result<Version, StoreError>;

    /// Atomically stores a transaction, its entries and the new balances of
    /// `accounts`
    ///
    /// Each account is written only if its stored version equals
    /// `account.version`; one stale account aborts the whole unit.
    ///
    /// # Returns
    ///
    /// The new version of each account, in the order given
    async fn write_transaction(
        &self,
        transaction: &Transaction,
        accounts: &[Account],
    ) -> Result<Vec<Version>, StoreError>;

    async fn read_account(&self, id: AccountId) -> Result<Account, StoreError>;

    async fn read_account_by_external_id(&self, external_id: &str) -> Result<Account, StoreError>;

    /// Reads accounts matching `filter`, newest first
    async fn read_accounts(&self, filter: &ReadAccountFilter) -> Result<Vec<Account>, StoreError>;

    async fn read_transaction(&self, id: TransactionId) -> Result<Transaction, StoreError>;

    async fn read_transaction_by_external_id(&self, external_id: &str) -> Result<Transaction, StoreError>;

    /// Reads transactions matching `filter`, newest first
    async fn read_transactions(&self, filter: &ReadTransactionFilter) -> Result<Vec<Transaction>, StoreError>;

    async fn read_entries_of_account(&self, id: AccountId) -> Result<Vec<Entry>, StoreError>;

    /// Reads entries matching `filter`, newest first
    async fn read_entries(&self, filter: &ReadEntryFilter) -> Result<Vec<Entry>, StoreError>;

    async fn read_entries_of_transaction(&self, id: TransactionId) -> Result<Vec<Entry>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let id = AccountId::new();
        let err = StoreError::not_found("Account", id);
        assert!(err.is_not_found());
        assert!(err.to_string().contains("ACC-"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(StoreError::ConsistencyViolation { message: "2 rows".into() }.is_fatal());
        assert!(!StoreError::conflict("dup").is_fatal());
        assert!(!StoreError::storage("down").is_fatal());
    }
}
