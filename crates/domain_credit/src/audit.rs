//! Append-only credit log
//!
//! One entry per balance change, stored under the id of the transaction
//! that made it. Appending is always the last step of a ledger mutation.

use core_kernel::record::{decode, encode};
use core_kernel::{credit_log_key, Amount, LedgerStore, RequestContext};
use tracing::{debug, instrument};

use crate::credit::{Credit, CreditLogEntry, LogType, CREDIT_LOG_DOC_TYPE};
use crate::error::CreditError;

/// Writer and reader of credit log entries
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLog;

impl AuditLog {
    /// Fails if the current transaction already wrote an entry
    ///
    /// # Errors
    ///
    /// Returns `CreditError::DuplicateLogEntry` if the key is occupied
    pub async fn ensure_vacant(
        ctx: &RequestContext,
        store: &dyn LedgerStore,
    ) -> Result<(), CreditError> {
        let key = credit_log_key(ctx.tx_id())?;
        if store.get_state(&key).await?.is_some() {
            return Err(CreditError::DuplicateLogEntry(ctx.tx_id().to_string()));
        }
        Ok(())
    }

    /// Appends the entry for a balance change already applied to `credit`
    ///
    /// # Arguments
    ///
    /// * `credit` - The account after the change
    /// * `title` - Free-text description of the change
    /// * `kind` - The operation performed
    /// * `magnitude` - The amount moved; placed on the credit or debit side per `kind`
    #[instrument(skip(ctx, store, credit, title), fields(tx_id = %ctx.tx_id(), credit_id = %credit.id))]
    pub async fn append(
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        credit: &Credit,
        title: &str,
        kind: LogType,
        magnitude: Amount,
    ) -> Result<CreditLogEntry, CreditError> {
        Self::ensure_vacant(ctx, store).await?;

        let (credit_side, debit_side) = kind.sides(magnitude);
        let entry = CreditLogEntry {
            doc_type: CREDIT_LOG_DOC_TYPE.to_string(),
            id: ctx.tx_id().to_string(),
            credit_id: credit.id.clone(),
            org_id: credit.org_id.clone(),
            kind,
            title: title.to_string(),
            credit: credit_side,
            debit: debit_side,
            amount: credit.amount,
            tx_timestamp: ctx.tx_timestamp_secs(),
        };

        store
            .put_state(&credit_log_key(ctx.tx_id())?, encode(&entry)?)
            .await?;
        debug!(balance = %entry.amount, "Credit log entry appended");
        Ok(entry)
    }

    /// Reads the entry written by a transaction
    pub async fn read(
        store: &dyn LedgerStore,
        tx_id: &str,
    ) -> Result<Option<CreditLogEntry>, CreditError> {
        match store.get_state(&credit_log_key(tx_id)?).await? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }
}
