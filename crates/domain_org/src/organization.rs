//! Organization records and request types

use core_kernel::{Record, RequestContext};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Discriminator of organization records
pub const ORGANIZATION_DOC_TYPE: &str = "Organization";

/// An organization registered on the ledger
///
/// Each organization owns exactly one credit account, referenced by
/// `org_credit_id`. `pub_key_pem` is empty until a key is bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub doc_type: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub institution_id: String,
    pub institution_name: String,
    pub desc: String,
    pub org_credit_id: String,
    pub logo_url: String,
    pub is_active: bool,
    #[serde(default)]
    pub pub_key_type: String,
    #[serde(default)]
    pub pub_key_pem: String,
    pub create_tx_timestamp: i64,
    #[serde(default)]
    pub update_tx_timestamp: i64,
}

impl Organization {
    /// Builds the record for a newly registered organization
    pub fn from_new(ctx: &RequestContext, new: &NewOrganization, org_credit_id: &str) -> Self {
        Self {
            doc_type: ORGANIZATION_DOC_TYPE.to_string(),
            id: new.id.clone(),
            name: new.name.clone(),
            email: String::new(),
            institution_id: new.institution_id.clone(),
            institution_name: new.institution_name.clone(),
            desc: new.desc.clone(),
            org_credit_id: org_credit_id.to_string(),
            logo_url: new.logo_url.clone(),
            is_active: new.is_active,
            pub_key_type: String::new(),
            pub_key_pem: String::new(),
            create_tx_timestamp: ctx.tx_timestamp_secs(),
            update_tx_timestamp: 0,
        }
    }

    /// Returns true once a public key has been bound
    pub fn has_public_key(&self) -> bool {
        !self.pub_key_pem.is_empty()
    }

    /// Replaces the mutable descriptive fields
    pub fn apply_update(&mut self, ctx: &RequestContext, update: &OrganizationUpdate) {
        self.name = update.name.clone();
        self.desc = update.desc.clone();
        self.email = update.email.clone().unwrap_or_default();
        self.institution_id = update.institution_id.clone();
        self.institution_name = update.institution_name.clone();
        self.logo_url = update.logo_url.clone();
        self.is_active = update.is_active;
        self.update_tx_timestamp = ctx.tx_timestamp_secs();
    }
}

impl Record for Organization {
    const DOC_TYPE: &'static str = ORGANIZATION_DOC_TYPE;

    fn doc_type(&self) -> &str {
        &self.doc_type
    }
}

/// Arguments of organization registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub institution_id: String,
    pub institution_name: String,
    pub logo_url: String,
    /// Opening balance of the credit account, a decimal string
    pub initial_credit: String,
    /// Label of the credit account
    pub credit_title: String,
    pub is_active: bool,
}

/// Replacement values for an organization's mutable fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUpdate {
    pub id: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub desc: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
    pub institution_id: String,
    pub institution_name: String,
    pub logo_url: String,
    pub is_active: bool,
}
