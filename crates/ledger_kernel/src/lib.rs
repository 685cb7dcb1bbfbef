//! Ledger Kernel - entities and ports shared by the ledger engine and its storage
//!
//! This crate provides the building blocks every storage backend speaks:
//! - Typed identifiers for accounts, transactions and entries
//! - The ledger entities with their nullable, precision-preserving fields
//! - Optional-field read filters
//! - The `LedgerReadWriter` port, its error type and adapter health checks

pub mod identifiers;
pub mod money;
pub mod account;
pub mod transaction;
pub mod filter;
pub mod ports;

pub use identifiers::{AccountId, TransactionId, EntryId};
pub use money::{Currency, Balance, Side};
pub use account::{Account, Version, INITIAL_VERSION};
pub use transaction::{Transaction, Entry};
pub use filter::{ReadAccountFilter, ReadTransactionFilter, ReadEntryFilter};
pub use ports::{AdapterHealth, HealthCheckResult, HealthCheckable, LedgerReadWriter, StoreError};
