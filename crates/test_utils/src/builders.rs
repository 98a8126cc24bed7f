//! Test Data Builders
//!
//! Provides builders for request contexts and a small harness that hands
//! out transactions with unique ids and increasing ledger time.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};
use core_kernel::{AccessPolicy, CallerIdentity, RequestContext};
use domain_credit::CreditLedger;
use domain_org::{OrganizationRegistry, UpdatePrecondition};
use infra_store::{LedgerTransaction, MemoryLedger};

use crate::fixtures::{IdentityFixtures, TemporalFixtures};

/// Builder for a single request context
pub struct ContextBuilder {
    tx_id: String,
    timestamp: DateTime<Utc>,
    identity: CallerIdentity,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    /// Creates a builder for a super-admin call at genesis
    pub fn new() -> Self {
        Self {
            tx_id: "tx-test".to_string(),
            timestamp: TemporalFixtures::genesis(),
            identity: IdentityFixtures::super_admin(),
        }
    }

    pub fn with_tx_id(mut self, tx_id: impl Into<String>) -> Self {
        self.tx_id = tx_id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_identity(mut self, identity: CallerIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn build(self) -> RequestContext {
        RequestContext::new(self.tx_id, self.timestamp, self.identity)
    }
}

/// Transaction harness over a fresh [`MemoryLedger`]
///
/// Every call to [`LedgerHarness::begin`] gets a unique transaction id and a
/// ledger time one second after the previous one.
pub struct LedgerHarness {
    pub ledger: MemoryLedger,
    pub policy: AccessPolicy,
    sequence: AtomicI64,
}

impl Default for LedgerHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerHarness {
    pub fn new() -> Self {
        Self::with_policy(AccessPolicy::default())
    }

    pub fn with_policy(policy: AccessPolicy) -> Self {
        Self {
            ledger: MemoryLedger::new(),
            policy,
            sequence: AtomicI64::new(0),
        }
    }

    /// Starts a transaction for a caller
    pub fn begin(&self, identity: CallerIdentity) -> (RequestContext, LedgerTransaction) {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let ctx = ContextBuilder::new()
            .with_tx_id(format!("tx-{:06}", n))
            .with_timestamp(TemporalFixtures::genesis() + Duration::seconds(n))
            .with_identity(identity)
            .build();
        let tx = self.ledger.begin(ctx.tx_id());
        (ctx, tx)
    }

    /// Starts a super-admin transaction
    pub fn begin_admin(&self) -> (RequestContext, LedgerTransaction) {
        self.begin(IdentityFixtures::super_admin())
    }

    pub fn credit_ledger(&self) -> CreditLedger {
        CreditLedger::new(self.policy.clone())
    }

    pub fn registry(&self) -> OrganizationRegistry {
        OrganizationRegistry::new(self.policy.clone())
    }

    pub fn registry_with(&self, precondition: UpdatePrecondition) -> OrganizationRegistry {
        self.registry().with_update_precondition(precondition)
    }
}
