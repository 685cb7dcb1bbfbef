//! Repository implementations for ledger entities
//!
//! Repositories own the SQL and map between rows and kernel entities through
//! the codec.
//!
//! # Architecture
//!
//! - Runtime-checked queries with bind parameters, no string-spliced values
//! - Version-checked writes for every change to an existing account
//! - One database transaction per ledger commit

pub mod accounts;
pub mod entries;
pub mod transactions;

pub use accounts::AccountRepository;
pub use entries::EntryRepository;
pub use transactions::TransactionRepository;
