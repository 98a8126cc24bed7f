//! Error taxonomy shared by every crate
//!
//! Each crate defines its own `thiserror` enum; every variant maps onto one
//! [`ErrorCode`] so callers (and the HTTP gateway) can branch on a stable
//! name without matching on crate-specific types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::AccessError;
use crate::amount::AmountError;
use crate::keys::KeyError;
use crate::ports::StoreError;

/// Stable, wire-visible error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    PermissionDenied,
    MissingAttribute,
    NotFound,
    AlreadyExists,
    InvalidAmount,
    InsufficientBalance,
    DuplicateLogEntry,
    DecodeError,
    UnsupportedKeyType,
    InvalidKey,
    KeyTaken,
    AlreadyBound,
    Validation,
    UnknownFunction,
    InvalidArguments,
    Conflict,
    Store,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PermissionDenied => "PermissionDenied",
            ErrorCode::MissingAttribute => "MissingAttribute",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::AlreadyExists => "AlreadyExists",
            ErrorCode::InvalidAmount => "InvalidAmount",
            ErrorCode::InsufficientBalance => "InsufficientBalance",
            ErrorCode::DuplicateLogEntry => "DuplicateLogEntry",
            ErrorCode::DecodeError => "DecodeError",
            ErrorCode::UnsupportedKeyType => "UnsupportedKeyType",
            ErrorCode::InvalidKey => "InvalidKey",
            ErrorCode::KeyTaken => "KeyTaken",
            ErrorCode::AlreadyBound => "AlreadyBound",
            ErrorCode::Validation => "Validation",
            ErrorCode::UnknownFunction => "UnknownFunction",
            ErrorCode::InvalidArguments => "InvalidArguments",
            ErrorCode::Conflict => "Conflict",
            ErrorCode::Store => "Store",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AccessError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AccessError::PermissionDenied => ErrorCode::PermissionDenied,
            AccessError::MissingAttribute(_) => ErrorCode::MissingAttribute,
        }
    }
}

impl AmountError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidAmount
    }
}

impl KeyError {
    /// Malformed key parts are caller input errors
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidArguments
    }
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::InvalidKey(e) => e.code(),
            StoreError::InvalidBookmark(_) => ErrorCode::InvalidArguments,
            StoreError::Conflict { .. } | StoreError::DuplicateTransaction(_) => {
                ErrorCode::Conflict
            }
            StoreError::Backend { .. } => ErrorCode::Store,
        }
    }
}
