//! Ledger transactions and their entries
//!
//! A transaction owns its entries: both are created in the same atomic unit
//! and neither is modified afterwards.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde_json::Value;

use crate::identifiers::{AccountId, EntryId, TransactionId};
use crate::money::{Currency, Side};

/// A ledger transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    /// Caller-supplied idempotency key, unique across transactions
    pub external_id: String,
    pub description: String,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<Entry>,
}

impl Transaction {
    /// Creates a new transaction without entries
    pub fn new(
        external_id: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            external_id: external_id.into(),
            description: description.into(),
            metadata: None,
            created_at,
            entries: Vec::new(),
        }
    }

    /// Sets the metadata document
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Appends an entry owned by this transaction
    ///
    /// The entry inherits the transaction id and creation time. Entry ids are
    /// time-ordered so entries read back in the order they were added.
    pub fn add_entry(
        &mut self,
        account_id: AccountId,
        entry_side: Side,
        account_side: Side,
        amount: impl Into<BigInt>,
        currency: impl Into<Currency>,
    ) -> &Entry {
        self.entries.push(Entry {
            id: EntryId::new_v7(),
            transaction_id: self.id,
            account_id,
            entry_side,
            account_side,
            amount: Some(amount.into()),
            currency: currency.into(),
            created_at: self.created_at,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Returns the ids of every account touched by an entry, first-seen order
    pub fn affected_account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !ids.contains(&entry.account_id) {
                ids.push(entry.account_id);
            }
        }
        ids
    }
}

/// One side of a transaction's effect on one account
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub transaction_id: TransactionId,
    pub account_id: AccountId,
    /// Side this entry applies to the account
    pub entry_side: Side,
    /// The account's normal side when the entry was recorded
    pub account_side: Side,
    /// Amount in minor units; `None` is distinct from zero
    pub amount: Option<BigInt>,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}
