//! Tests for ledger entities and read filters

use chrono::{TimeZone, Utc};
use num_bigint::BigInt;
use serde_json::json;

use ledger_kernel::{
    Account, AccountId, Balance, Currency, ReadAccountFilter, ReadEntryFilter,
    ReadTransactionFilter, Side, Transaction, TransactionId,
};

mod account_tests {
    use super::*;

    #[test]
    fn test_new_account_has_no_optional_state() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let account = Account::new("ext-1", "Cash", Side::Debit, created);

        assert_eq!(account.external_id, "ext-1");
        assert_eq!(account.normal_side, Side::Debit);
        assert!(account.balance.is_none());
        assert!(account.metadata.is_none());
        assert!(account.updated_at.is_none());
        assert!(!account.is_deleted());
        assert_eq!(account.version, 0);
    }

    #[test]
    fn test_builders_set_balance_and_metadata() {
        let account = Account::new("ext-2", "Revenue", Side::Credit, Utc::now())
            .with_balance(Balance::new().with("BRL", 10020))
            .with_metadata(json!({"foo": "bar"}));

        let balance = account.balance.as_ref().unwrap();
        assert_eq!(balance.get(&Currency::from("BRL")), Some(&BigInt::from(10020)));
        assert_eq!(account.metadata, Some(json!({"foo": "bar"})));
    }

    #[test]
    fn test_soft_delete_sets_markers() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut account = Account::new("ext-3", "Old", Side::Debit, Utc::now());
        account.soft_delete(at);

        assert!(account.is_deleted());
        assert_eq!(account.deleted_at, Some(at));
        assert_eq!(account.updated_at, Some(at));
    }
}

mod transaction_tests {
    use super::*;

    #[test]
    fn test_add_entry_inherits_transaction_identity() {
        let mut tx = Transaction::new("dep-1", "deposit", Utc::now());
        let debit = AccountId::new();
        let credit = AccountId::new();

        tx.add_entry(debit, Side::Debit, Side::Debit, 10020, "BRL");
        tx.add_entry(credit, Side::Credit, Side::Credit, 10020, "BRL");

        assert_eq!(tx.entries.len(), 2);
        for entry in &tx.entries {
            assert_eq!(entry.transaction_id, tx.id);
            assert_eq!(entry.created_at, tx.created_at);
            assert_eq!(entry.amount, Some(BigInt::from(10020)));
        }
    }

    #[test]
    fn test_affected_account_ids_are_unique_and_ordered() {
        let mut tx = Transaction::new("fx-1", "conversion", Utc::now());
        let a = AccountId::new();
        let b = AccountId::new();

        tx.add_entry(a, Side::Debit, Side::Debit, 1, "USD");
        tx.add_entry(b, Side::Credit, Side::Credit, 1, "USD");
        tx.add_entry(a, Side::Credit, Side::Debit, 5, "BRL");

        assert_eq!(tx.affected_account_ids(), vec![a, b]);
    }
}

mod filter_tests {
    use super::*;

    #[test]
    fn test_all_is_unbounded() {
        assert!(ReadAccountFilter::all().is_unbounded());
        assert!(!ReadAccountFilter::all().external_ids(["a"]).is_unbounded());
    }

    #[test]
    fn test_empty_set_is_distinct_from_absent() {
        let filter = ReadAccountFilter::all().account_ids(Vec::new());
        assert_eq!(filter.account_ids, Some(Vec::new()));
        assert!(!filter.is_unbounded());
    }

    #[test]
    fn test_transaction_and_entry_filters_collect_ids() {
        let tx_id = TransactionId::new();
        let tx_filter = ReadTransactionFilter::all()
            .transaction_ids([tx_id])
            .external_ids(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(tx_filter.transaction_ids, Some(vec![tx_id]));
        assert_eq!(tx_filter.external_ids.as_ref().map(Vec::len), Some(2));

        let entry_filter = ReadEntryFilter::all().transaction_ids([tx_id]);
        assert!(entry_filter.account_ids.is_none());
        assert_eq!(entry_filter.transaction_ids, Some(vec![tx_id]));
    }
}
