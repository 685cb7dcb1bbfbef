//! Custom Test Assertions
//!
//! Assertion helpers for store results that print the offending value
//! instead of a bare `false`.

use std::fmt::Debug;

use num_bigint::BigInt;

use ledger_kernel::{Account, Currency, Entry, StoreError};

/// Asserts that `account` holds exactly `expected` in `currency`
///
/// # Panics
///
/// Panics if the account has no balance, no amount in that currency, or a
/// different amount
pub fn assert_balance_eq(account: &Account, currency: &str, expected: impl Into<BigInt>) {
    let expected = expected.into();
    let actual = account
        .balance
        .as_ref()
        .and_then(|balance| balance.get(&Currency::from(currency)));
    assert_eq!(
        actual,
        Some(&expected),
        "Balance mismatch for {} in {}: expected {}, got {:?}",
        account.external_id,
        currency,
        expected,
        actual
    );
}

/// Asserts that a store call failed with `NotFound`
pub fn assert_not_found<T: Debug>(result: Result<T, StoreError>) {
    match result {
        Err(StoreError::NotFound { .. }) => {}
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

/// Asserts that a store call failed with `Conflict`
pub fn assert_conflict<T: Debug>(result: Result<T, StoreError>) {
    match result {
        Err(StoreError::Conflict { .. }) => {}
        other => panic!("Expected Conflict, got {:?}", other),
    }
}

/// Asserts that two entry lists hold the same entries, ignoring order
pub fn assert_same_entries(actual: &[Entry], expected: &[Entry]) {
    let mut actual = actual.to_vec();
    let mut expected = expected.to_vec();
    actual.sort_by_key(|entry| entry.id);
    expected.sort_by_key(|entry| entry.id);
    assert_eq!(actual, expected, "Entry sets differ");
}

/// Asserts that timestamps are in non-increasing order
pub fn assert_newest_first<T>(items: &[T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    for pair in items.windows(2) {
        assert!(
            created_at(&pair[0]) >= created_at(&pair[1]),
            "Expected newest first, found {} before {}",
            created_at(&pair[0]),
            created_at(&pair[1])
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::AccountBuilder;

    #[test]
    fn test_assert_balance_eq_passes() {
        let account = AccountBuilder::new().with_balance("BRL", 10020).build();
        assert_balance_eq(&account, "BRL", 10020);
    }

    #[test]
    #[should_panic(expected = "Balance mismatch")]
    fn test_assert_balance_eq_fails_on_missing_currency() {
        let account = AccountBuilder::new().with_balance("BRL", 1).build();
        assert_balance_eq(&account, "USD", 1);
    }

    #[test]
    fn test_error_assertions_match_variants() {
        assert_not_found::<()>(Err(StoreError::not_found("Account", "x")));
        assert_conflict::<()>(Err(StoreError::conflict("dup")));
    }
}
