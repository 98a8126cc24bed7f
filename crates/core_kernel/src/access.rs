//! Attribute-based authorization gate
//!
//! Every mutating operation asks the gate first. The gate only reads the
//! caller's verified identity; it never touches the store and has no side
//! effects on failure.
//!
//! # Policies
//!
//! - **Super-admin**: issued by the configured admin authority and carrying
//!   `admin=true`
//! - **Org-admin**: `org.id` equals the target organization and `org.role`
//!   equals the configured admin role
//! - **Org-member**: `org.id` equals the target organization, any role
//!
//! Combined checks pass when either side passes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{CallerIdentity, RequestContext};

/// Attribute carrying the super-admin claim
pub const ADMIN_ATTRIBUTE: &str = "admin";
/// Attribute carrying the caller's organization id
pub const ORG_ID_ATTRIBUTE: &str = "org.id";
/// Attribute carrying the caller's role within its organization
pub const ORG_ROLE_ATTRIBUTE: &str = "org.role";
/// Attribute carrying the caller's platform role
pub const ROLE_ATTRIBUTE: &str = "role";

/// Authorization failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Permission denied: caller not authorized for this scope")]
    PermissionDenied,

    #[error("Identity attribute not found: {0}")]
    MissingAttribute(String),
}

/// Deployment-specific authorization settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// The issuing authority whose admins are super-admins
    pub admin_msp_id: String,
    /// The `org.role` value that makes a member an org-admin
    pub org_admin_role: String,
    /// Prefix applied to every attribute name (e.g. `acme.` gives `acme.org.id`)
    #[serde(default)]
    pub attribute_prefix: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            admin_msp_id: "LedgerAdminMSP".to_string(),
            org_admin_role: "admin".to_string(),
            attribute_prefix: String::new(),
        }
    }
}

impl AccessPolicy {
    pub fn new(admin_msp_id: impl Into<String>) -> Self {
        Self {
            admin_msp_id: admin_msp_id.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_prefix = prefix.into();
        self
    }

    /// Returns the fully qualified name of an attribute
    pub fn attribute_name(&self, attribute: &str) -> String {
        format!("{}{}", self.attribute_prefix, attribute)
    }

    /// Returns a gate evaluating this policy against the caller of `ctx`
    pub fn gate<'a>(&'a self, ctx: &'a RequestContext) -> AccessGate<'a> {
        AccessGate::new(self, ctx.identity())
    }
}

/// Evaluates an [`AccessPolicy`] against one caller identity
#[derive(Debug, Clone, Copy)]
pub struct AccessGate<'a> {
    policy: &'a AccessPolicy,
    identity: &'a CallerIdentity,
}

impl<'a> AccessGate<'a> {
    pub fn new(policy: &'a AccessPolicy, identity: &'a CallerIdentity) -> Self {
        Self { policy, identity }
    }

    fn attribute(&self, attribute: &str) -> Option<&'a str> {
        self.identity.attribute(&self.policy.attribute_name(attribute))
    }

    pub fn is_super_admin(&self) -> bool {
        self.identity.msp_id() == self.policy.admin_msp_id
            && self.attribute(ADMIN_ATTRIBUTE) == Some("true")
    }

    pub fn is_org_admin(&self, org_id: &str) -> bool {
        self.is_org_member(org_id)
            && self.attribute(ORG_ROLE_ATTRIBUTE) == Some(self.policy.org_admin_role.as_str())
    }

    pub fn is_org_member(&self, org_id: &str) -> bool {
        self.attribute(ORG_ID_ATTRIBUTE) == Some(org_id)
    }

    pub fn require_super_admin(&self) -> Result<(), AccessError> {
        self.require(self.is_super_admin())
    }

    pub fn require_org_admin(&self, org_id: &str) -> Result<(), AccessError> {
        self.require(self.is_org_admin(org_id))
    }

    pub fn require_org_member(&self, org_id: &str) -> Result<(), AccessError> {
        self.require(self.is_org_member(org_id))
    }

    pub fn require_super_admin_or_org_admin(&self, org_id: &str) -> Result<(), AccessError> {
        self.require(self.is_super_admin() || self.is_org_admin(org_id))
    }

    pub fn require_super_admin_or_org_member(&self, org_id: &str) -> Result<(), AccessError> {
        self.require(self.is_super_admin() || self.is_org_member(org_id))
    }

    /// Returns the organization id the caller belongs to
    ///
    /// # Errors
    ///
    /// Returns `AccessError::MissingAttribute` if the identity carries no `org.id`
    pub fn caller_org_id(&self) -> Result<&'a str, AccessError> {
        self.attribute(ORG_ID_ATTRIBUTE)
            .ok_or_else(|| AccessError::MissingAttribute(self.policy.attribute_name(ORG_ID_ATTRIBUTE)))
    }

    /// Returns the caller's platform role, if any
    pub fn caller_role(&self) -> Option<&'a str> {
        self.attribute(ROLE_ATTRIBUTE)
    }

    fn require(&self, allowed: bool) -> Result<(), AccessError> {
        if allowed {
            Ok(())
        } else {
            Err(AccessError::PermissionDenied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::new("AdminMSP")
    }

    #[test]
    fn test_super_admin_requires_authority_and_claim() {
        let policy = policy();

        let admin = CallerIdentity::new("AdminMSP").with_attribute("admin", "true");
        assert!(AccessGate::new(&policy, &admin).require_super_admin().is_ok());

        let wrong_authority = CallerIdentity::new("OtherMSP").with_attribute("admin", "true");
        assert_eq!(
            AccessGate::new(&policy, &wrong_authority).require_super_admin(),
            Err(AccessError::PermissionDenied)
        );

        let no_claim = CallerIdentity::new("AdminMSP");
        assert!(AccessGate::new(&policy, &no_claim).require_super_admin().is_err());

        let false_claim = CallerIdentity::new("AdminMSP").with_attribute("admin", "false");
        assert!(AccessGate::new(&policy, &false_claim).require_super_admin().is_err());
    }

    #[test]
    fn test_org_scopes() {
        let policy = policy();
        let org_admin = CallerIdentity::new("Org1MSP")
            .with_attribute("org.id", "ORG1")
            .with_attribute("org.role", "admin");
        let member = CallerIdentity::new("Org1MSP")
            .with_attribute("org.id", "ORG1")
            .with_attribute("org.role", "viewer");

        let gate = AccessGate::new(&policy, &org_admin);
        assert!(gate.require_org_admin("ORG1").is_ok());
        assert!(gate.require_org_admin("ORG2").is_err());
        assert!(gate.require_super_admin_or_org_admin("ORG1").is_ok());
        assert!(gate.require_super_admin().is_err());

        let gate = AccessGate::new(&policy, &member);
        assert!(gate.require_org_member("ORG1").is_ok());
        assert!(gate.require_org_admin("ORG1").is_err());
        assert!(gate.require_super_admin_or_org_member("ORG1").is_ok());
        assert!(gate.require_super_admin_or_org_member("ORG2").is_err());
    }

    #[test]
    fn test_prefixed_attributes() {
        let policy = policy().with_attribute_prefix("acme.");
        let identity = CallerIdentity::new("Org1MSP")
            .with_attribute("acme.org.id", "ORG1")
            .with_attribute("org.id", "ORG2");

        let gate = AccessGate::new(&policy, &identity);
        assert!(gate.is_org_member("ORG1"));
        assert!(!gate.is_org_member("ORG2"));
        assert_eq!(gate.caller_org_id(), Ok("ORG1"));
    }

    #[test]
    fn test_missing_org_attribute() {
        let policy = policy();
        let identity = CallerIdentity::new("Org1MSP");
        assert_eq!(
            AccessGate::new(&policy, &identity).caller_org_id(),
            Err(AccessError::MissingAttribute("org.id".to_string()))
        );
    }
}
