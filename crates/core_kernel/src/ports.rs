//! Ledger store port
//!
//! The hosting ledger supplies a transactional, versioned key-value store.
//! This module defines the port the domain crates program against, so that the
//! same ledger logic runs on the in-memory store used by tests and the
//! development gateway or on any other adapter.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │      Contract / Registry / Credit Ledger     │
//! └──────────────────────────────────────────────┘
//!                       │ LedgerStore
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  one transaction of the host ledger          │
//! │  get / put / query / query_paginated         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! A store handle is scoped to one transaction: reads observe a consistent
//! snapshot plus the transaction's own writes, and writes become visible to
//! others only when the host commits the transaction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::keys::KeyError;

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key could not be addressed
    #[error("Invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// A pagination bookmark was not produced by this store
    #[error("Invalid bookmark: {0}")]
    InvalidBookmark(String),

    /// A key read by the transaction changed before it could commit
    #[error("Conflict: key {key:?} changed since transaction {tx_id} read it")]
    Conflict { tx_id: String, key: String },

    /// The transaction id has already been committed
    #[error("Transaction {0} already committed")]
    DuplicateTransaction(String),

    /// The underlying storage failed
    #[error("Storage backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Creates a Backend error
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if resubmitting the whole invocation may succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Sort direction of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// A single-field sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

/// A secondary-index query: equality predicates plus an optional sort
///
/// Serializes to the CouchDB-style descriptor understood by rich-query
/// capable ledgers:
///
/// ```text
/// {"selector": {"docType": "OrgCreditLog", "orgId": "ORG1"},
///  "sort": [{"txTimestamp": "desc"}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub selector: BTreeMap<String, Value>,
    pub sort: Option<SortSpec>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality predicate on a field
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.selector.insert(field.into(), value.into());
        self
    }

    /// Sorts results by a single field
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortSpec {
            field: field.into(),
            order,
        });
        self
    }

    /// Returns true if a JSON document satisfies every predicate
    pub fn matches(&self, document: &Value) -> bool {
        self.selector
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// Renders the query descriptor
    pub fn to_value(&self) -> Value {
        let selector: Map<String, Value> = self
            .selector
            .iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();

        let mut query = json!({ "selector": selector });
        if let Some(sort) = &self.sort {
            query["sort"] = json!([{ sort.field.clone(): sort.order.to_string() }]);
        }
        query
    }
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

/// One key/value pair returned by a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub key: String,
    pub value: Vec<u8>,
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPage {
    pub records: Vec<QueryRecord>,
    /// Opaque cursor resuming after the last record; empty once exhausted
    pub bookmark: String,
}

/// The transactional key-value store supplied by the host ledger
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Reads the value under a key
    ///
    /// # Returns
    ///
    /// `None` if no value is stored under the key
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stages a write of a value under a key
    async fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Runs a secondary-index query and returns every match
    async fn query(&self, query: &QuerySpec) -> Result<Vec<QueryRecord>, StoreError>;

    /// Runs a secondary-index query and returns one page of matches
    ///
    /// # Arguments
    ///
    /// * `query` - The selector and sort to apply
    /// * `page_size` - Maximum number of records to return
    /// * `bookmark` - Cursor returned by the previous page, empty to start
    async fn query_paginated(
        &self,
        query: &QuerySpec,
        page_size: u32,
        bookmark: &str,
    ) -> Result<QueryPage, StoreError>;
}

/// Health status of a store adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check result for a store adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

/// Trait for adapters that support health checks
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_descriptor_rendering() {
        let query = QuerySpec::new()
            .where_eq("docType", "OrgCreditLog")
            .where_eq("orgId", "ORG1")
            .sort_by("txTimestamp", SortOrder::Desc);

        assert_eq!(
            query.to_value(),
            json!({
                "selector": { "docType": "OrgCreditLog", "orgId": "ORG1" },
                "sort": [{ "txTimestamp": "desc" }]
            })
        );
    }

    #[test]
    fn test_query_without_sort_has_no_sort_clause() {
        let query = QuerySpec::new().where_eq("docType", "Organization");
        assert!(query.to_value().get("sort").is_none());
    }

    #[test]
    fn test_selector_matching() {
        let query = QuerySpec::new()
            .where_eq("docType", "Organization")
            .where_eq("isActive", true);

        assert!(query.matches(&json!({ "docType": "Organization", "isActive": true, "id": "A" })));
        assert!(!query.matches(&json!({ "docType": "Organization", "isActive": false })));
        assert!(!query.matches(&json!({ "isActive": true })));
    }

    #[test]
    fn test_store_error_conflict() {
        let error = StoreError::Conflict {
            tx_id: "tx-1".to_string(),
            key: "k".to_string(),
        };
        assert!(error.is_conflict());
        assert!(!StoreError::backend("disk").is_conflict());
    }
}
