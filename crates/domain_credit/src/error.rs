//! Credit domain errors

use core_kernel::{AccessError, Amount, AmountError, ErrorCode, KeyError, RecordError, StoreError};
use thiserror::Error;

/// Errors that can occur in the credit domain
#[derive(Debug, Error)]
pub enum CreditError {
    /// Caller is not authorized for the operation
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Credit account already exists
    #[error("Credit {credit_id} of organization {org_id} already exists")]
    AlreadyExists { credit_id: String, org_id: String },

    /// Credit account not found
    #[error("Credit {credit_id} of organization {org_id} not found")]
    NotFound { credit_id: String, org_id: String },

    /// Amount argument or arithmetic result is invalid
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    /// Debit exceeds the remaining balance
    #[error("Insufficient balance in credit {credit_id}: requested {requested}, available {available}")]
    InsufficientBalance {
        credit_id: String,
        requested: Amount,
        available: Amount,
    },

    /// A log entry already exists for this transaction
    #[error("Credit log entry {0} already exists")]
    DuplicateLogEntry(String),

    /// A stored record could not be decoded
    #[error(transparent)]
    Record(#[from] RecordError),

    /// An id part cannot be used in a key
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CreditError {
    pub fn already_exists(credit_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        CreditError::AlreadyExists {
            credit_id: credit_id.into(),
            org_id: org_id.into(),
        }
    }

    pub fn not_found(credit_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        CreditError::NotFound {
            credit_id: credit_id.into(),
            org_id: org_id.into(),
        }
    }

    /// Returns the taxonomy code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            CreditError::Access(e) => e.code(),
            CreditError::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            CreditError::NotFound { .. } => ErrorCode::NotFound,
            CreditError::InvalidAmount(e) => e.code(),
            CreditError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            CreditError::DuplicateLogEntry(_) => ErrorCode::DuplicateLogEntry,
            CreditError::Record(e) => e.code(),
            CreditError::Key(e) => e.code(),
            CreditError::Store(e) => e.code(),
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.code() == ErrorCode::PermissionDenied
    }
}
