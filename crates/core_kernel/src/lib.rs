//! Core Kernel - Foundational types for the organization credit ledger
//!
//! This crate provides the building blocks used by every other crate:
//! - Exact decimal amounts
//! - Composite state keys
//! - The per-invocation request context and caller identity
//! - The attribute-based authorization gate
//! - The ledger store port and query descriptors
//! - JSON state record encoding
//! - The shared error taxonomy

pub mod access;
pub mod amount;
pub mod context;
pub mod error;
pub mod keys;
pub mod ports;
pub mod record;

pub use access::{AccessError, AccessGate, AccessPolicy};
pub use amount::{Amount, AmountError};
pub use context::{CallerIdentity, RequestContext};
pub use error::ErrorCode;
pub use keys::{
    create_composite_key, credit_key, credit_log_key, organization_key, split_composite_key,
    EntityKind, KeyError,
};
pub use ports::{
    AdapterHealth, HealthCheckResult, HealthCheckable, LedgerStore, QueryPage, QueryRecord,
    QuerySpec, SortOrder, SortSpec, StoreError,
};
pub use record::{Record, RecordError};
