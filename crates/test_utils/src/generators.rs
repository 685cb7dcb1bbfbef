//! Property-Based Test Generators
//!
//! Provides proptest strategies for ledger values, including amounts far
//! outside the 64-bit range.

use chrono::{DateTime, TimeZone, Utc};
use num_bigint::{BigInt, Sign};
use proptest::prelude::*;
use serde_json::{json, Value};

use ledger_kernel::{Account, AccountId, Balance, Currency, Side, Transaction};

use crate::builders::{AccountBuilder, TransactionBuilder};

/// Strategy for generating currency codes
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::from("BRL")),
        Just(Currency::from("USD")),
        Just(Currency::from("EUR")),
        Just(Currency::from("JPY")),
        "[A-Z]{3}".prop_map(|code: String| Currency::new(code)),
    ]
}

/// Strategy for generating sides
pub fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Debit), Just(Side::Credit)]
}

/// Strategy for generating signed amounts of up to 256 bits
pub fn amount_strategy() -> impl Strategy<Value = BigInt> {
    (any::<bool>(), prop::collection::vec(any::<u32>(), 0..8)).prop_map(|(negative, digits)| {
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        BigInt::from_slice(sign, &digits)
    })
}

/// Strategy for generating multi-currency balances
pub fn balance_strategy() -> impl Strategy<Value = Balance> {
    prop::collection::vec((currency_strategy(), amount_strategy()), 0..5)
        .prop_map(|pairs| pairs.into_iter().collect())
}

/// Strategy for generating optional metadata documents
pub fn metadata_strategy() -> impl Strategy<Value = Option<Value>> {
    prop::option::of(
        ("[a-z]{1,8}", any::<i64>(), any::<bool>())
            .prop_map(|(key, number, flag)| json!({ key: number, "flag": flag, "nested": {"n": number} })),
    )
}

/// Strategy for generating timestamps in 2024 with microsecond precision
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp_micros();
    let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap().timestamp_micros();
    (start..end).prop_map(|micros| Utc.timestamp_micros(micros).unwrap())
}

/// Strategy for generating accounts with any optional state
pub fn account_strategy() -> impl Strategy<Value = Account> {
    (
        side_strategy(),
        prop::option::of(balance_strategy()),
        metadata_strategy(),
        timestamp_strategy(),
        prop::option::of(timestamp_strategy()),
        prop::option::of(timestamp_strategy()),
        1..1_000i64,
    )
        .prop_map(|(side, balance, metadata, created_at, updated_at, deleted_at, version)| {
            let mut account = AccountBuilder::new()
                .with_normal_side(side)
                .with_created_at(created_at)
                .build();
            account.balance = balance;
            account.metadata = metadata;
            account.updated_at = updated_at;
            account.deleted_at = deleted_at;
            account.version = version;
            account
        })
}

/// Strategy for generating transactions with up to six entries
///
/// Some entries carry no amount at all.
pub fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    let entry = (
        side_strategy(),
        side_strategy(),
        prop::option::of(amount_strategy()),
        currency_strategy(),
    );
    (
        metadata_strategy(),
        timestamp_strategy(),
        prop::collection::vec(entry, 0..6),
    )
        .prop_map(|(metadata, created_at, entries)| {
            let mut transaction = TransactionBuilder::new().with_created_at(created_at).build();
            transaction.metadata = metadata;
            for (entry_side, account_side, amount, currency) in entries {
                transaction.add_entry(AccountId::new(), entry_side, account_side, 0, currency);
                if let Some(added) = transaction.entries.last_mut() {
                    added.amount = amount;
                }
            }
            transaction
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_timestamps_have_microsecond_precision(ts in timestamp_strategy()) {
            prop_assert_eq!(ts.timestamp_subsec_nanos() % 1_000, 0);
        }

        #[test]
        fn test_transaction_entries_belong_to_it(transaction in transaction_strategy()) {
            for entry in &transaction.entries {
                prop_assert_eq!(entry.transaction_id, transaction.id);
                prop_assert_eq!(entry.created_at, transaction.created_at);
            }
        }

        #[test]
        fn test_balances_never_repeat_a_currency(balance in balance_strategy()) {
            let codes: Vec<&str> = balance.iter().map(|(c, _)| c.code()).collect();
            let mut deduped = codes.clone();
            deduped.dedup();
            prop_assert_eq!(codes, deduped);
        }
    }
}
