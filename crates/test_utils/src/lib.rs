//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! credit ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built identities, timestamps, keys and organizations
//! - `builders`: Request contexts and a transaction harness over `MemoryLedger`
//! - `assertions`: Custom assertion helpers for credit records
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
