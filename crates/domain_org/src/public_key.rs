//! Organization public key validation
//!
//! Only ECDSA keys on NIST P-384 are accepted, supplied as a PEM-encoded
//! SubjectPublicKeyInfo (`-----BEGIN PUBLIC KEY-----`).

use p384::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use p384::PublicKey;

use crate::error::OrgError;

/// The only supported key type identifier
pub const SUPPORTED_KEY_TYPE: &str = "ecdsa:P-384";

/// Checks the key type identifier
pub fn ensure_supported_key_type(key_type: &str) -> Result<(), OrgError> {
    if key_type != SUPPORTED_KEY_TYPE {
        return Err(OrgError::UnsupportedKeyType(key_type.to_string()));
    }
    Ok(())
}

/// Parses a PEM SubjectPublicKeyInfo and checks it holds a P-384 point
pub fn parse_public_key(pem: &str) -> Result<PublicKey, OrgError> {
    PublicKey::from_public_key_pem(pem.trim()).map_err(|e| OrgError::InvalidKey(e.to_string()))
}

/// Parses a key and re-encodes it as LF-terminated PEM
///
/// Two spellings of the same key always produce the same string.
pub fn canonical_public_key_pem(pem: &str) -> Result<String, OrgError> {
    parse_public_key(pem)?
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| OrgError::InvalidKey(e.to_string()))
}
