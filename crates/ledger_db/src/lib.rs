//! Ledger Database Layer
//!
//! This crate persists ledger accounts, transactions and entries to
//! PostgreSQL using SQLx, and implements the kernel's `LedgerReadWriter` port.
//!
//! # Architecture
//!
//! - `codec`: row types and the lossless encoding of amounts and balances
//! - `repositories`: versioned account writes, the atomic transaction commit
//!   and filtered reads
//! - `query`: filter to SQL composition
//! - `migrate`: embedded schema migrations
//! - `adapter`: the port implementation the ledger engine talks to
//!
//! # Concurrency
//!
//! Every update of an existing account is conditioned on the version the
//! caller last read and increments it. A ledger commit writes the
//! transaction, its entries and every affected balance in one database
//! transaction, so a single stale account rolls the whole commit back.
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_db::{create_pool, DatabaseConfig, PostgresLedger, ProvisionTarget, SchemaProvisioner};
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! SchemaProvisioner::new(pool.clone()).provision(ProvisionTarget::Latest).await?;
//! let ledger = PostgresLedger::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod codec;
pub mod query;
pub mod repositories;
pub mod migrate;
pub mod adapter;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use migrate::{SchemaProvisioner, ProvisionTarget, ProvisionOutcome};
pub use adapter::PostgresLedger;
