//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Deterministic timestamps, currencies and amounts
//! - `builders`: Builders for accounts and transactions with sensible defaults
//! - `database`: PostgreSQL test containers with the schema provisioned
//! - `assertions`: Assertion helpers for store results
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
