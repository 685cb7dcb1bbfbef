//! Strongly-typed identifiers for ledger entities
//!
//! Newtype wrappers around UUIDs keep account, transaction and entry ids from
//! being mixed up at call sites that take several of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declares a UUID-backed ledger id
///
/// Ids print as `<PREFIX>-<uuid>` in logs and errors but are stored and
/// serialized as the bare UUID. Parsing accepts both spellings.
macro_rules! ledger_id {
    ($(#[$doc:meta])* $name:ident => $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Log prefix, without the trailing dash
            pub const PREFIX: &'static str = $prefix;

            /// Random (v4) id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Time-ordered (v7) id; later calls sort after earlier ones
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bare = s
                    .strip_prefix(Self::PREFIX)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .unwrap_or(s);
                Uuid::parse_str(bare).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

ledger_id!(
    /// Identity of an account row
    AccountId => "ACC"
);
ledger_id!(
    /// Identity of a transaction and the key its entries point at
    TransactionId => "TXN"
);
ledger_id!(
    /// Identity of one entry; generated as v7 so entries sort by insertion
    EntryId => "ENT"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_display() {
        let id = AccountId::new();
        assert!(id.to_string().starts_with("ACC-"));
    }

    #[test]
    fn test_id_parsing_with_and_without_prefix() {
        let original = TransactionId::new();
        let parsed: TransactionId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: TransactionId = original.as_uuid().to_string().parse().unwrap();
        assert_eq!(original, bare);
    }

    #[test]
    fn test_bare_uuid_that_looks_prefixed_parses() {
        let raw = "ACC01234-5678-4abc-8def-0123456789ab";
        let id: AccountId = raw.parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), raw.to_lowercase());
    }
}
