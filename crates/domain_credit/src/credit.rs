//! Credit account and credit log records

use core_kernel::{Amount, Record, RequestContext};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator of credit account records
pub const CREDIT_DOC_TYPE: &str = "OrgCredit";
/// Discriminator of credit log records
pub const CREDIT_LOG_DOC_TYPE: &str = "OrgCreditLog";

/// A credit account owned by one organization
///
/// By convention the account id equals the owning organization's id.
///
/// # Invariants
///
/// - `amount` is never negative
/// - `tx_timestamp` is the ledger time of the last mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub doc_type: String,
    pub id: String,
    pub org_id: String,
    /// Label supplied when the account was created
    #[serde(default)]
    pub title: String,
    pub amount: Amount,
    pub tx_timestamp: i64,
}

impl Credit {
    /// Creates an account record stamped with the context's ledger time
    pub fn new(
        ctx: &RequestContext,
        id: impl Into<String>,
        org_id: impl Into<String>,
        title: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            doc_type: CREDIT_DOC_TYPE.to_string(),
            id: id.into(),
            org_id: org_id.into(),
            title: title.into(),
            amount,
            tx_timestamp: ctx.tx_timestamp_secs(),
        }
    }
}

impl Record for Credit {
    const DOC_TYPE: &'static str = CREDIT_DOC_TYPE;

    fn doc_type(&self) -> &str {
        &self.doc_type
    }
}

/// The balance-changing operation recorded by a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Mint,
    Burn,
    Spend,
}

impl LogType {
    /// Splits an operation magnitude into its `(credit, debit)` sides
    pub fn sides(&self, magnitude: Amount) -> (Amount, Amount) {
        match self {
            LogType::Mint => (magnitude, Amount::ZERO),
            LogType::Burn | LogType::Spend => (Amount::ZERO, magnitude),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Mint => "mint",
            LogType::Burn => "burn",
            LogType::Spend => "spend",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable audit record of one balance change
///
/// Keyed by the id of the transaction that made the change, so a
/// transaction can write at most one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditLogEntry {
    pub doc_type: String,
    /// Id of the transaction that wrote the entry
    pub id: String,
    pub credit_id: String,
    pub org_id: String,
    #[serde(rename = "type")]
    pub kind: LogType,
    pub title: String,
    pub credit: Amount,
    pub debit: Amount,
    /// Balance after the change
    pub amount: Amount,
    pub tx_timestamp: i64,
}

impl CreditLogEntry {
    /// Returns the non-zero side of the entry
    pub fn magnitude(&self) -> Amount {
        match self.kind {
            LogType::Mint => self.credit,
            LogType::Burn | LogType::Spend => self.debit,
        }
    }
}

impl Record for CreditLogEntry {
    const DOC_TYPE: &'static str = CREDIT_LOG_DOC_TYPE;

    fn doc_type(&self) -> &str {
        &self.doc_type
    }
}
