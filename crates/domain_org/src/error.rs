//! Organization domain errors

use core_kernel::{AccessError, ErrorCode, KeyError, RecordError, StoreError};
use domain_credit::CreditError;
use thiserror::Error;
use validator::ValidationErrors;

/// Errors that can occur in the organization domain
#[derive(Debug, Error)]
pub enum OrgError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Organization {0} already exists")]
    AlreadyExists(String),

    #[error("Organization {0} not found")]
    NotFound(String),

    #[error("Invalid organization fields: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Unsupported public key type: {0:?}")]
    UnsupportedKeyType(String),

    #[error("Public key invalid: {0}")]
    InvalidKey(String),

    #[error("Organization {0} already has a public key")]
    AlreadyBound(String),

    #[error("Public key is already taken")]
    KeyTaken,

    /// Provisioning the credit account failed
    #[error(transparent)]
    Credit(#[from] CreditError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrgError {
    /// Returns the taxonomy code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            OrgError::Access(e) => e.code(),
            OrgError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            OrgError::NotFound(_) => ErrorCode::NotFound,
            OrgError::Validation(_) => ErrorCode::Validation,
            OrgError::UnsupportedKeyType(_) => ErrorCode::UnsupportedKeyType,
            OrgError::InvalidKey(_) => ErrorCode::InvalidKey,
            OrgError::AlreadyBound(_) => ErrorCode::AlreadyBound,
            OrgError::KeyTaken => ErrorCode::KeyTaken,
            OrgError::Credit(e) => e.code(),
            OrgError::Record(e) => e.code(),
            OrgError::Key(e) => e.code(),
            OrgError::Store(e) => e.code(),
        }
    }
}
