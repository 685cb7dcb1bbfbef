//! Optional-field read filters
//!
//! Every field is optional. A present field narrows the result (all present
//! fields are combined with AND); an absent field imposes no condition. A
//! present but empty id set matches nothing.

use chrono::{DateTime, Utc};

use crate::identifiers::{AccountId, TransactionId};

/// Filter for reading accounts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadAccountFilter {
    /// Inclusive lower bound on `created_at`
    pub from_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub to_date: Option<DateTime<Utc>>,
    pub account_ids: Option<Vec<AccountId>>,
    pub external_ids: Option<Vec<String>>,
}

impl ReadAccountFilter {
    /// A filter with no conditions, matching every account
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, from: DateTime<Utc>) -> Self {
        self.from_date = Some(from);
        self
    }

    pub fn to_date(mut self, to: DateTime<Utc>) -> Self {
        self.to_date = Some(to);
        self
    }

    pub fn account_ids(mut self, ids: impl IntoIterator<Item = AccountId>) -> Self {
        self.account_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn external_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.external_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true when no field is set
    pub fn is_unbounded(&self) -> bool {
        self == &Self::default()
    }
}

/// Filter for reading transactions
///
/// `account_ids` matches transactions with at least one entry against one of
/// the given accounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadTransactionFilter {
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub account_ids: Option<Vec<AccountId>>,
    pub external_ids: Option<Vec<String>>,
    pub transaction_ids: Option<Vec<TransactionId>>,
}

impl ReadTransactionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, from: DateTime<Utc>) -> Self {
        self.from_date = Some(from);
        self
    }

    pub fn to_date(mut self, to: DateTime<Utc>) -> Self {
        self.to_date = Some(to);
        self
    }

    pub fn account_ids(mut self, ids: impl IntoIterator<Item = AccountId>) -> Self {
        self.account_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn external_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.external_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn transaction_ids(mut self, ids: impl IntoIterator<Item = TransactionId>) -> Self {
        self.transaction_ids = Some(ids.into_iter().collect());
        self
    }
}

/// Filter for reading entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadEntryFilter {
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub account_ids: Option<Vec<AccountId>>,
    pub transaction_ids: Option<Vec<TransactionId>>,
}

impl ReadEntryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, from: DateTime<Utc>) -> Self {
        self.from_date = Some(from);
        self
    }

    pub fn to_date(mut self, to: DateTime<Utc>) -> Self {
        self.to_date = Some(to);
        self
    }

    pub fn account_ids(mut self, ids: impl IntoIterator<Item = AccountId>) -> Self {
        self.account_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn transaction_ids(mut self, ids: impl IntoIterator<Item = TransactionId>) -> Self {
        self.transaction_ids = Some(ids.into_iter().collect());
        self
    }
}
