//! Composite state keys
//!
//! Every persisted entity lives under a key built from its entity kind and an
//! ordered list of identifying parts:
//!
//! ```text
//! U+0000 kind U+0000 part₁ U+0000 part₂ U+0000 ...
//! ```
//!
//! The kind is part of the key, so two entity kinds never collide even when
//! their id parts match.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DELIMITER: char = '\u{0}';
const MAX_CODE_POINT: char = '\u{10FFFF}';

/// Errors raised while building or splitting a composite key
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Composite key kind must not be empty")]
    EmptyKind,

    #[error("Composite key part '{0}' contains a reserved character")]
    ReservedCharacter(String),

    #[error("Not a composite key: {0:?}")]
    NotComposite(String),
}

/// The kinds of entity stored on the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Organization,
    Credit,
    CreditLog,
}

impl EntityKind {
    /// Returns the key namespace for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Organization => "Organization",
            EntityKind::Credit => "OrganizationCredit",
            EntityKind::CreditLog => "OrganizationCreditLog",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a composite key from a kind and its id parts
///
/// # Errors
///
/// Returns `KeyError::EmptyKind` for an empty kind and
/// `KeyError::ReservedCharacter` when the kind or a part contains `U+0000`
/// or `U+10FFFF`.
pub fn create_composite_key<S: AsRef<str>>(kind: &str, parts: &[S]) -> Result<String, KeyError> {
    if kind.is_empty() {
        return Err(KeyError::EmptyKind);
    }
    validate_part(kind)?;

    let mut key = String::with_capacity(
        2 + kind.len() + parts.iter().map(|p| p.as_ref().len() + 1).sum::<usize>(),
    );
    key.push(DELIMITER);
    key.push_str(kind);
    key.push(DELIMITER);
    for part in parts {
        let part = part.as_ref();
        validate_part(part)?;
        key.push_str(part);
        key.push(DELIMITER);
    }
    Ok(key)
}

/// Splits a composite key back into its kind and id parts
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), KeyError> {
    let body = key
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_suffix(DELIMITER))
        .ok_or_else(|| KeyError::NotComposite(key.to_string()))?;

    let mut segments = body.split(DELIMITER);
    let kind = segments
        .next()
        .filter(|kind| !kind.is_empty())
        .ok_or(KeyError::EmptyKind)?;

    Ok((kind.to_string(), segments.map(str::to_string).collect()))
}

fn validate_part(part: &str) -> Result<(), KeyError> {
    if part.contains(DELIMITER) || part.contains(MAX_CODE_POINT) {
        return Err(KeyError::ReservedCharacter(part.escape_debug().to_string()));
    }
    Ok(())
}

/// Key of an organization record
pub fn organization_key(id: &str) -> Result<String, KeyError> {
    create_composite_key(EntityKind::Organization.as_str(), &[id])
}

/// Key of a credit account, addressed by account id and owning organization
pub fn credit_key(id: &str, org_id: &str) -> Result<String, KeyError> {
    create_composite_key(EntityKind::Credit.as_str(), &[id, org_id])
}

/// Key of a credit log entry, addressed by the transaction that wrote it
pub fn credit_log_key(tx_id: &str) -> Result<String, KeyError> {
    create_composite_key(EntityKind::CreditLog.as_str(), &[tx_id])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_key_layout() {
        let key = organization_key("ORG-MUST").unwrap();
        assert_eq!(key, "\u{0}Organization\u{0}ORG-MUST\u{0}");
    }

    #[test]
    fn test_kinds_never_collide() {
        let org = create_composite_key("Organization", &["X"]).unwrap();
        let credit = create_composite_key("OrganizationCredit", &["X"]).unwrap();
        let log = credit_log_key("X").unwrap();
        assert_ne!(org, credit);
        assert_ne!(credit, log);
        assert_ne!(org, log);
    }

    #[test]
    fn test_split_is_inverse() {
        let key = credit_key("ORG1", "ORG1").unwrap();
        let (kind, parts) = split_composite_key(&key).unwrap();
        assert_eq!(kind, "OrganizationCredit");
        assert_eq!(parts, vec!["ORG1".to_string(), "ORG1".to_string()]);
    }

    #[test]
    fn test_reserved_characters_rejected() {
        assert!(matches!(
            organization_key("bad\u{0}id"),
            Err(KeyError::ReservedCharacter(_))
        ));
        assert!(matches!(
            credit_key("ok", "bad\u{10FFFF}"),
            Err(KeyError::ReservedCharacter(_))
        ));
        assert_eq!(create_composite_key::<&str>("", &[]), Err(KeyError::EmptyKind));
    }
}
