//! Ledger accounts
//!
//! An account is created once and afterwards only changed through a
//! version-checked write. The `version` field is the stamp the caller last
//! observed; storage refuses any write whose stamp is stale.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::identifiers::AccountId;
use crate::money::{Balance, Side};

/// Optimistic concurrency stamp of an account row
pub type Version = i64;

/// Version assigned to an account the first time it is stored
pub const INITIAL_VERSION: Version = 1;

/// A ledger account
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Unique identifier, immutable
    pub id: AccountId,
    /// Caller-supplied idempotency key, unique across accounts
    pub external_id: String,
    /// Display name
    pub name: String,
    /// Side on which the balance naturally increases, fixed at creation
    pub normal_side: Side,
    /// Pre-computed balance per currency, `None` when never set
    pub balance: Option<Balance>,
    /// Opaque caller metadata
    pub metadata: Option<Value>,
    /// Version stamp last observed by the holder of this value
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Creates a new, not yet stored account
    ///
    /// # Arguments
    ///
    /// * `external_id` - Idempotency key supplied by the caller
    /// * `name` - Display name
    /// * `normal_side` - The account's normal side
    /// * `created_at` - Creation timestamp
    pub fn new(
        external_id: impl Into<String>,
        name: impl Into<String>,
        normal_side: Side,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            external_id: external_id.into(),
            name: name.into(),
            normal_side,
            balance: None,
            metadata: None,
            version: 0,
            created_at,
            updated_at: None,
            deleted_at: None,
        }
    }

    /// Sets the metadata document
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets the balance
    pub fn with_balance(mut self, balance: Balance) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Marks the account as deleted at `at`
    ///
    /// The mark only becomes durable once written through a versioned upsert.
    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.updated_at = Some(at);
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
