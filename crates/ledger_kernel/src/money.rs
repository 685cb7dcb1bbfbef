//! Currency codes, debit/credit sides and multi-currency balances
//!
//! Amounts are arbitrary-precision integers in minor units. The kernel never
//! does arithmetic on them; balances arrive pre-computed from the ledger
//! engine and are stored as given.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A caller-supplied currency code such as `"BRL"` or `"USD"`
///
/// The code is opaque to storage; it is only used as a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        Self(code)
    }
}

/// The side of a ledger posting, or the normal side of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    /// Returns the other side
    pub fn opposite(&self) -> Side {
        match self {
            Side::Debit => Side::Credit,
            Side::Credit => Side::Debit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Debit => "debit",
            Side::Credit => "credit",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-currency balance of an account, in minor units
///
/// Iteration is ordered by currency code so encoded balances are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balance(BTreeMap<Currency, BigInt>);

impl Balance {
    /// Creates an empty balance
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the amount held in `currency`, if any was recorded
    pub fn get(&self, currency: &Currency) -> Option<&BigInt> {
        self.0.get(currency)
    }

    /// Records `amount` for `currency`, replacing any previous value
    pub fn set(&mut self, currency: impl Into<Currency>, amount: impl Into<BigInt>) {
        self.0.insert(currency.into(), amount.into());
    }

    /// Builder-style variant of [`Balance::set`]
    pub fn with(mut self, currency: impl Into<Currency>, amount: impl Into<BigInt>) -> Self {
        self.set(currency, amount);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Currency, &BigInt)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Currency, BigInt)> for Balance {
    fn from_iter<I: IntoIterator<Item = (Currency, BigInt)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<Currency, BigInt>> for Balance {
    fn from(map: BTreeMap<Currency, BigInt>) -> Self {
        Self(map)
    }
}

impl IntoIterator for Balance {
    type Item = (Currency, BigInt);
    type IntoIter = std::collections::btree_map::IntoIter<Currency, BigInt>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
