//! Pre-built Test Fixtures
//!
//! Deterministic timestamps, currencies and amounts shared by the ledger
//! tests, plus a minimal posting rule so tests can compute the balances a
//! ledger engine would hand to storage.

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use num_bigint::BigInt;

use ledger_kernel::{Account, Balance, Currency, Transaction};

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Current time truncated to the microsecond precision PostgreSQL stores
    pub fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    /// Jan 1, 2024
    pub fn start_of_2024() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    /// Jun 15, 2024 at noon
    pub fn mid_2024() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    /// Noon on the given day of 2024
    pub fn day_of_2024(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
    }
}

/// Fixture for currency and amount test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn brl() -> Currency {
        Currency::from("BRL")
    }

    /// BRL 100.20 in minor units
    pub fn deposit_amount() -> BigInt {
        BigInt::from(10020)
    }

    /// An amount no 64-bit integer can hold
    pub fn huge_amount() -> BigInt {
        "123456789012345678901234567890123456789".parse().unwrap()
    }
}

/// Applies `transaction` to the balances of `accounts`
///
/// An entry on the account's normal side adds its amount, any other entry
/// subtracts it. Touched accounts get `updated_at` set to the transaction
/// time. Entries for accounts not in the slice are ignored.
pub fn apply_entries(transaction: &Transaction, accounts: &mut [Account]) {
    for entry in &transaction.entries {
        let Some(account) = accounts.iter_mut().find(|a| a.id == entry.account_id) else {
            continue;
        };
        let amount = entry.amount.clone().unwrap_or_default();
        let delta = if entry.entry_side == account.normal_side { amount } else { -amount };

        let mut balance = account.balance.take().unwrap_or_else(Balance::new);
        let current = balance.get(&entry.currency).cloned().unwrap_or_default();
        balance.set(entry.currency.clone(), current + delta);
        account.balance = Some(balance);
        account.updated_at = Some(transaction.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_kernel::Side;

    #[test]
    fn test_now_has_microsecond_precision() {
        let now = TemporalFixtures::now();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_apply_entries_follows_normal_side() {
        let created = TemporalFixtures::mid_2024();
        let mut accounts = vec![
            Account::new("cash", "Cash", Side::Debit, created),
            Account::new("equity", "Equity", Side::Credit, created),
        ];
        let mut tx = Transaction::new("dep", "deposit", created);
        tx.add_entry(accounts[0].id, Side::Debit, Side::Debit, 10020, "BRL");
        tx.add_entry(accounts[1].id, Side::Credit, Side::Credit, 10020, "BRL");
        tx.add_entry(accounts[0].id, Side::Credit, Side::Debit, 20, "BRL");

        apply_entries(&tx, &mut accounts);

        let brl = MoneyFixtures::brl();
        assert_eq!(accounts[0].balance.as_ref().unwrap().get(&brl), Some(&BigInt::from(10000)));
        assert_eq!(accounts[1].balance.as_ref().unwrap().get(&brl), Some(&BigInt::from(10020)));
        assert_eq!(accounts[0].updated_at, Some(created));
    }
}
