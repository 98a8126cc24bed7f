//! JSON state records
//!
//! Every entity is stored as a JSON document carrying a `docType`
//! discriminator, which secondary-index selectors filter on. Decoding checks
//! the discriminator so a record of one kind is never read as another.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::error::ErrorCode;

/// Errors raised while encoding or decoding a state record
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Malformed {doc_type} record: {message}")]
    Malformed {
        doc_type: &'static str,
        message: String,
    },

    #[error("Expected a {expected} record, found docType '{found}'")]
    WrongDocType {
        expected: &'static str,
        found: String,
    },

    #[error("Failed to encode {doc_type} record: {message}")]
    Encode {
        doc_type: &'static str,
        message: String,
    },
}

impl RecordError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RecordError::Malformed { .. } | RecordError::WrongDocType { .. } => {
                ErrorCode::DecodeError
            }
            RecordError::Encode { .. } => ErrorCode::Store,
        }
    }
}

/// A persisted entity
pub trait Record: Serialize + DeserializeOwned {
    /// Discriminator written to the `docType` field
    const DOC_TYPE: &'static str;

    /// The `docType` carried by this instance
    fn doc_type(&self) -> &str;
}

/// Encodes a record as JSON bytes
pub fn encode<R: Record>(record: &R) -> Result<Vec<u8>, RecordError> {
    serde_json::to_vec(record).map_err(|e| RecordError::Encode {
        doc_type: R::DOC_TYPE,
        message: e.to_string(),
    })
}

/// Decodes JSON bytes into a record, checking its discriminator
pub fn decode<R: Record>(bytes: &[u8]) -> Result<R, RecordError> {
    let record: R = serde_json::from_slice(bytes).map_err(|e| RecordError::Malformed {
        doc_type: R::DOC_TYPE,
        message: e.to_string(),
    })?;

    if record.doc_type() != R::DOC_TYPE {
        return Err(RecordError::WrongDocType {
            expected: R::DOC_TYPE,
            found: record.doc_type().to_string(),
        });
    }
    Ok(record)
}
