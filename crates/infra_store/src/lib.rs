//! Infrastructure Store Layer
//!
//! This crate provides an in-memory implementation of the `LedgerStore` port
//! with the transactional guarantees the credit ledger relies on:
//!
//! - **Snapshot reads** with read-your-own-writes inside a transaction
//! - **MVCC validation** at commit: a transaction whose read set changed is
//!   rejected with `StoreError::Conflict` and must be resubmitted
//! - **Idempotent commit log**: a transaction id commits at most once
//! - **Rich queries** with equality selectors, single-field sort and offset
//!   bookmarks
//!
//! It backs the test suites and the development gateway.

pub mod memory;
mod query;

pub use memory::{CommitReceipt, LedgerTransaction, MemoryLedger};
