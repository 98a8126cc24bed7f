//! In-memory ledger
//!
//! `MemoryLedger` keeps committed state as versioned entries behind a shared
//! lock. Each invocation works on a [`LedgerTransaction`]:
//!
//! - reads see committed state plus the transaction's own staged writes
//! - every key read from committed state is recorded with its version
//! - writes are staged and only applied by [`LedgerTransaction::commit`]
//! - commit fails with `StoreError::Conflict` if any recorded key changed
//!   and with `StoreError::DuplicateTransaction` if the id already committed
//! - dropping a transaction without committing discards its writes
//!
//! Rich queries are evaluated against the same merged view but do not add
//! their results to the read set, so they are not phantom-protected.
//!
//! # Example
//!
//! ```rust,ignore
//! let ledger = MemoryLedger::new();
//! let tx = ledger.begin("tx-1");
//! tx.put_state(&key, bytes).await?;
//! let receipt = tx.commit().await?;
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};

use core_kernel::{
    AdapterHealth, HealthCheckResult, HealthCheckable, LedgerStore, QueryPage, QueryRecord,
    QuerySpec, StoreError,
};

use crate::query;

/// Version recorded for a key that had no committed value when read
const ABSENT: u64 = 0;

#[derive(Debug, Clone)]
struct Versioned {
    value: Vec<u8>,
    version: u64,
}

#[derive(Debug, Default)]
struct LedgerState {
    entries: BTreeMap<String, Versioned>,
    height: u64,
    committed: HashSet<String>,
}

impl LedgerState {
    fn version_of(&self, key: &str) -> u64 {
        self.entries.get(key).map_or(ABSENT, |entry| entry.version)
    }
}

/// Outcome of a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: String,
    /// Ledger height after this commit
    pub height: u64,
    /// Number of keys written
    pub writes: usize,
}

/// Shared in-memory ledger
///
/// Cloning is cheap; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a transaction
    ///
    /// # Arguments
    ///
    /// * `tx_id` - The unique id of the invocation; it can commit once
    pub fn begin(&self, tx_id: impl Into<String>) -> LedgerTransaction {
        let tx_id = tx_id.into();
        debug!(tx_id = %tx_id, "Beginning transaction");
        LedgerTransaction {
            tx_id,
            state: Arc::clone(&self.state),
            buffers: Mutex::new(TxBuffers::default()),
            finished: false,
        }
    }

    /// Number of committed transactions
    pub async fn height(&self) -> u64 {
        self.state.read().await.height
    }

    /// Number of committed keys
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Reads committed state outside of any transaction
    pub async fn committed_value(&self, key: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .await
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Returns true if a transaction with this id has committed
    pub async fn is_committed(&self, tx_id: &str) -> bool {
        self.state.read().await.committed.contains(tx_id)
    }
}

#[async_trait]
impl HealthCheckable for MemoryLedger {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let (keys, height) = {
            let state = self.state.read().await;
            (state.entries.len(), state.height)
        };

        HealthCheckResult {
            adapter_id: "memory-ledger".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: start.elapsed().as_millis() as u64,
            message: Some(format!("{} keys at height {}", keys, height)),
            checked_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
struct TxBuffers {
    reads: HashMap<String, u64>,
    writes: BTreeMap<String, Vec<u8>>,
}

/// One transaction against a [`MemoryLedger`]
#[derive(Debug)]
pub struct LedgerTransaction {
    tx_id: String,
    state: Arc<RwLock<LedgerState>>,
    buffers: Mutex<TxBuffers>,
    finished: bool,
}

impl LedgerTransaction {
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Number of staged writes
    pub async fn pending_writes(&self) -> usize {
        self.buffers.lock().await.writes.len()
    }

    /// Validates the read set and applies staged writes atomically
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateTransaction` if this id has already committed
    /// - `StoreError::Conflict` if a key read by this transaction changed
    #[instrument(skip(self), fields(tx_id = %self.tx_id))]
    pub async fn commit(mut self) -> Result<CommitReceipt, StoreError> {
        self.finished = true;
        let buffers = std::mem::take(self.buffers.get_mut());
        let mut state = self.state.write().await;

        if state.committed.contains(&self.tx_id) {
            warn!("Rejecting replayed transaction");
            return Err(StoreError::DuplicateTransaction(self.tx_id.clone()));
        }

        if let Some((key, _)) = buffers
            .reads
            .iter()
            .find(|(key, version)| state.version_of(key) != **version)
        {
            warn!(key = ?key, "Read set changed before commit");
            return Err(StoreError::Conflict {
                tx_id: self.tx_id.clone(),
                key: key.clone(),
            });
        }

        state.height += 1;
        let version = state.height;
        let writes = buffers.writes.len();
        for (key, value) in buffers.writes {
            state.entries.insert(key, Versioned { value, version });
        }
        state.committed.insert(self.tx_id.clone());

        debug!(height = version, writes, "Transaction committed");
        Ok(CommitReceipt {
            tx_id: self.tx_id.clone(),
            height: version,
            writes,
        })
    }

    /// Discards every staged write
    pub fn rollback(mut self) {
        self.finished = true;
        debug!(tx_id = %self.tx_id, "Transaction rolled back");
    }

    /// Committed entries overlaid with this transaction's staged writes
    async fn merged_view(&self) -> BTreeMap<String, Vec<u8>> {
        let state = self.state.read().await;
        let buffers = self.buffers.lock().await;

        let mut view: BTreeMap<String, Vec<u8>> = state
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect();
        view.extend(
            buffers
                .writes
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        view
    }
}

impl Drop for LedgerTransaction {
    fn drop(&mut self) {
        if !self.finished {
            let discarded = self.buffers.get_mut().writes.len();
            if discarded > 0 {
                debug!(tx_id = %self.tx_id, discarded, "Discarding uncommitted writes");
            }
        }
    }
}

#[async_trait]
impl LedgerStore for LedgerTransaction {
    #[instrument(skip(self, key), fields(tx_id = %self.tx_id, key = ?key))]
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let state = self.state.read().await;
        let mut buffers = self.buffers.lock().await;
        if let Some(staged) = buffers.writes.get(key) {
            debug!("Read own staged write");
            return Ok(Some(staged.clone()));
        }

        let entry = state.entries.get(key);
        buffers
            .reads
            .entry(key.to_string())
            .or_insert_with(|| entry.map_or(ABSENT, |e| e.version));

        debug!(found = entry.is_some(), "Read committed state");
        Ok(entry.map(|e| e.value.clone()))
    }

    #[instrument(skip(self, key, value), fields(tx_id = %self.tx_id, key = ?key, bytes = value.len()))]
    async fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::backend("key must not be empty"));
        }
        debug!("Staging write");
        self.buffers.lock().await.writes.insert(key.to_string(), value);
        Ok(())
    }

    #[instrument(skip(self, query), fields(tx_id = %self.tx_id, query = %query))]
    async fn query(&self, query: &QuerySpec) -> Result<Vec<QueryRecord>, StoreError> {
        let view = self.merged_view().await;
        let records = query::select(&view, query);
        debug!(matched = records.len(), "Query evaluated");
        Ok(records)
    }

    #[instrument(skip(self, query), fields(tx_id = %self.tx_id, query = %query))]
    async fn query_paginated(
        &self,
        query: &QuerySpec,
        page_size: u32,
        bookmark: &str,
    ) -> Result<QueryPage, StoreError> {
        let view = self.merged_view().await;
        let page = query::paginate(query::select(&view, query), page_size, bookmark)?;
        debug!(returned = page.records.len(), "Page evaluated");
        Ok(page)
    }
}
