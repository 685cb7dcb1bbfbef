//! Test Data Builders
//!
//! Builders for accounts and transactions. Every default is valid and unique
//! per call, so tests only spell out the fields they care about and never
//! collide on external ids.

use chrono::{DateTime, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use num_bigint::BigInt;
use serde_json::Value;
use uuid::Uuid;

use ledger_kernel::{Account, Balance, Currency, Side, Transaction};

use crate::fixtures::TemporalFixtures;

fn unique_external_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Builder for test accounts
pub struct AccountBuilder {
    account: Account,
}

impl Default for AccountBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountBuilder {
    /// A debit-normal account with a random name and unique external id
    pub fn new() -> Self {
        let name: String = CompanyName().fake();
        Self {
            account: Account::new(unique_external_id("acct"), name, Side::Debit, TemporalFixtures::now()),
        }
    }

    /// A debit-normal account
    pub fn debit() -> Self {
        Self::new().with_normal_side(Side::Debit)
    }

    /// A credit-normal account
    pub fn credit() -> Self {
        Self::new().with_normal_side(Side::Credit)
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.account.external_id = external_id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.account.name = name.into();
        self
    }

    pub fn with_normal_side(mut self, side: Side) -> Self {
        self.account.normal_side = side;
        self
    }

    /// Sets one currency of the balance, creating the balance if needed
    pub fn with_balance(mut self, currency: impl Into<Currency>, amount: impl Into<BigInt>) -> Self {
        let balance = self.account.balance.take().unwrap_or_else(Balance::new);
        self.account.balance = Some(balance.with(currency, amount));
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.account.metadata = Some(metadata);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.account.created_at = created_at;
        self
    }

    pub fn build(self) -> Account {
        self.account
    }
}

/// Builder for test transactions
pub struct TransactionBuilder {
    transaction: Transaction,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    /// A transaction without entries, a random description and a unique
    /// external id
    pub fn new() -> Self {
        let description: String = Sentence(2..5).fake();
        Self {
            transaction: Transaction::new(unique_external_id("txn"), description, TemporalFixtures::now()),
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.transaction.external_id = external_id.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.transaction.metadata = Some(metadata);
        self
    }

    /// Sets the creation time of the transaction and its entries
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.transaction.created_at = created_at;
        for entry in &mut self.transaction.entries {
            entry.created_at = created_at;
        }
        self
    }

    /// Adds a debit entry against `account`
    pub fn debit(mut self, account: &Account, amount: impl Into<BigInt>, currency: impl Into<Currency>) -> Self {
        self.transaction
            .add_entry(account.id, Side::Debit, account.normal_side, amount, currency);
        self
    }

    /// Adds a credit entry against `account`
    pub fn credit(mut self, account: &Account, amount: impl Into<BigInt>, currency: impl Into<Currency>) -> Self {
        self.transaction
            .add_entry(account.id, Side::Credit, account.normal_side, amount, currency);
        self
    }

    /// Debits `debit` and credits `credit` with the same amount
    pub fn transfer(
        self,
        debit: &Account,
        credit: &Account,
        amount: impl Into<BigInt>,
        currency: impl Into<Currency>,
    ) -> Self {
        let amount = amount.into();
        let currency = currency.into();
        self.debit(debit, amount.clone(), currency.clone())
            .credit(credit, amount, currency)
    }

    pub fn build(self) -> Transaction {
        self.transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_builder_defaults_are_unique() {
        let a = AccountBuilder::new().build();
        let b = AccountBuilder::new().build();

        assert_ne!(a.id, b.id);
        assert_ne!(a.external_id, b.external_id);
        assert!(!a.name.is_empty());
        assert!(a.balance.is_none());
    }

    #[test]
    fn test_account_builder_accumulates_balance() {
        let account = AccountBuilder::credit()
            .with_balance("BRL", 1)
            .with_balance("USD", 2)
            .build();

        assert_eq!(account.normal_side, Side::Credit);
        assert_eq!(account.balance.unwrap().len(), 2);
    }

    #[test]
    fn test_transfer_adds_balanced_entries() {
        let debit = AccountBuilder::debit().build();
        let credit = AccountBuilder::credit().build();
        let created = TemporalFixtures::mid_2024();

        let tx = TransactionBuilder::new()
            .transfer(&debit, &credit, 10020, "BRL")
            .with_created_at(created)
            .build();

        assert_eq!(tx.entries.len(), 2);
        assert_eq!(tx.entries[0].entry_side, Side::Debit);
        assert_eq!(tx.entries[1].account_id, credit.id);
        assert!(tx.entries.iter().all(|e| e.created_at == created));
    }
}
