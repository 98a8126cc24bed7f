//! Transaction gateway
//!
//! Plays the host's part for the HTTP surface: assigns the transaction id
//! and ledger time, runs the request in its own transaction and commits the
//! writes only when the request succeeded.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use core_kernel::{CallerIdentity, RequestContext};
use infra_store::MemoryLedger;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::contract::{Contract, ContractError, Response};
use crate::request::Request;

/// Result of a committed invocation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub tx_id: String,
    pub payload: Response,
}

/// Hands out ledger times that strictly increase in whole seconds
///
/// Stored timestamps keep only seconds, so two transactions stamped within
/// the same second would tie. A requested time at or before the last
/// assigned second is moved to the second after it.
#[derive(Debug, Clone, Default)]
struct LedgerClock {
    last_secs: Arc<Mutex<Option<i64>>>,
}

impl LedgerClock {
    async fn assign(&self, requested: DateTime<Utc>) -> DateTime<Utc> {
        let mut last_secs = self.last_secs.lock().await;
        let secs = requested.timestamp();
        match *last_secs {
            Some(last) if secs <= last => {
                *last_secs = Some(last + 1);
                requested + Duration::seconds(last + 1 - secs)
            }
            _ => {
                *last_secs = Some(secs);
                requested
            }
        }
    }
}

/// Runs invocations against a [`MemoryLedger`]
#[derive(Debug, Clone)]
pub struct Gateway {
    ledger: MemoryLedger,
    contract: Contract,
    clock: LedgerClock,
}

impl Gateway {
    pub fn new(ledger: MemoryLedger, contract: Contract) -> Self {
        Self {
            ledger,
            contract,
            clock: LedgerClock::default(),
        }
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Decodes and submits an invocation at the current time
    pub async fn invoke(
        &self,
        identity: CallerIdentity,
        function: &str,
        args: &[String],
    ) -> Result<Invocation, ContractError> {
        let request = Request::decode(function, args)?;
        self.submit(identity, Utc::now(), request).await
    }

    /// Submits a decoded request under a fresh transaction id
    ///
    /// `timestamp` is the requested ledger time; it is advanced past the
    /// previous invocation's time when it does not already follow it.
    ///
    /// # Errors
    ///
    /// Returns the contract error unchanged, or `ContractError::Store` when
    /// the commit is rejected. No write of a failed invocation is kept.
    pub async fn submit(
        &self,
        identity: CallerIdentity,
        timestamp: DateTime<Utc>,
        request: Request,
    ) -> Result<Invocation, ContractError> {
        let timestamp = self.clock.assign(timestamp).await;
        let ctx = RequestContext::new(Uuid::new_v4().to_string(), timestamp, identity);
        let function = request.function();
        let tx = self.ledger.begin(ctx.tx_id());

        match self.contract.execute(&ctx, &tx, request).await {
            Ok(payload) => {
                let receipt = tx.commit().await?;
                info!(
                    tx_id = %receipt.tx_id,
                    function,
                    height = receipt.height,
                    writes = receipt.writes,
                    "Invocation committed"
                );
                Ok(Invocation {
                    tx_id: receipt.tx_id,
                    payload,
                })
            }
            Err(e) => {
                tx.rollback();
                warn!(tx_id = %ctx.tx_id(), function, code = %e.code(), error = %e, "Invocation failed");
                Err(e)
            }
        }
    }
}
