//! Request context
//!
//! Everything an operation needs to know about the invocation it runs in is
//! carried by an explicit [`RequestContext`]: the host-assigned transaction
//! id, the ledger timestamp and the verified identity of the caller. Nothing
//! is looked up ad hoc, so every operation is a function of its arguments,
//! its context and the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The verified identity of a caller, as supplied by the host
///
/// `msp_id` is the issuing authority; `attributes` are the signed claims
/// embedded in the identity (`admin`, `org.id`, `org.role`, `role`, possibly
/// under a deployment prefix).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub msp_id: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl CallerIdentity {
    /// Creates an identity issued by the given authority with no attributes
    pub fn new(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            attributes: HashMap::new(),
        }
    }

    /// Adds an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns the issuing authority
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// Returns an attribute value, if the identity carries it
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns true if the attribute is present with exactly this value
    pub fn has_attribute_value(&self, name: &str, value: &str) -> bool {
        self.attribute(name) == Some(value)
    }
}

/// The context of one ledger invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    tx_id: String,
    timestamp: DateTime<Utc>,
    identity: CallerIdentity,
}

impl RequestContext {
    /// Creates a context for a transaction
    ///
    /// # Arguments
    ///
    /// * `tx_id` - The host-assigned unique transaction identifier
    /// * `timestamp` - The ledger time of the transaction, identical on every replica
    /// * `identity` - The verified caller identity
    pub fn new(tx_id: impl Into<String>, timestamp: DateTime<Utc>, identity: CallerIdentity) -> Self {
        Self {
            tx_id: tx_id.into(),
            timestamp,
            identity,
        }
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Ledger time as Unix seconds, the resolution persisted on records
    pub fn tx_timestamp_secs(&self) -> i64 {
        self.timestamp.timestamp()
    }

    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }
}
