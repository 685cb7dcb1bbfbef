//! Storage round trips for generated ledger entities

use ledger_db::codec::{decode_all, AccountRow, EntryRow, TransactionRow};
use ledger_kernel::{Account, Entry};
use proptest::prelude::*;
use test_utils::{account_strategy, transaction_strategy};

proptest! {
    #[test]
    fn prop_account_survives_its_row(account in account_strategy()) {
        let decoded = Account::try_from(AccountRow::from(&account)).unwrap();
        prop_assert_eq!(decoded, account);
    }

    #[test]
    fn prop_absent_account_fields_stay_null(account in account_strategy()) {
        let row = AccountRow::from(&account);
        prop_assert_eq!(row.balance.is_none(), account.balance.is_none());
        prop_assert_eq!(row.metadata.is_none(), account.metadata.is_none());
        prop_assert_eq!(row.deleted_at.is_none(), account.deleted_at.is_none());
    }

    #[test]
    fn prop_entries_survive_their_rows(transaction in transaction_strategy()) {
        let rows: Vec<EntryRow> = transaction.entries.iter().map(EntryRow::from).collect();
        for (row, entry) in rows.iter().zip(&transaction.entries) {
            prop_assert_eq!(row.amount.is_none(), entry.amount.is_none());
        }
        let entries: Vec<Entry> = decode_all(rows).unwrap();
        prop_assert_eq!(&entries, &transaction.entries);
    }

    #[test]
    fn prop_transaction_survives_its_rows(transaction in transaction_strategy()) {
        let rows: Vec<EntryRow> = transaction.entries.iter().map(EntryRow::from).collect();
        let entries: Vec<Entry> = decode_all(rows).unwrap();
        let decoded = TransactionRow::from(&transaction).into_transaction(entries);
        prop_assert_eq!(decoded, transaction);
    }
}
