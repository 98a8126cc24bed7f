//! Organization registry
//!
//! CRUD over organization records. Registration provisions the
//! organization's credit account in the same transaction, so either both
//! records commit or neither does.

use std::fmt;
use std::str::FromStr;

use core_kernel::record::{decode, encode};
use core_kernel::{
    organization_key, AccessPolicy, LedgerStore, QuerySpec, RequestContext, SortOrder,
};
use domain_credit::CreditLedger;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::error::OrgError;
use crate::organization::{NewOrganization, Organization, OrganizationUpdate, ORGANIZATION_DOC_TYPE};
use crate::public_key::{canonical_public_key_pem, ensure_supported_key_type};

/// Existence precondition applied by [`OrganizationRegistry::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdatePrecondition {
    /// Update only organizations that exist; `NotFound` otherwise
    #[default]
    RequireExisting,
    /// Legacy rule: refuse with `AlreadyExists` when the organization exists,
    /// which makes every update of a registered organization fail
    RejectExisting,
}

impl FromStr for UpdatePrecondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "require-existing" => Ok(UpdatePrecondition::RequireExisting),
            "reject-existing" => Ok(UpdatePrecondition::RejectExisting),
            other => Err(format!("unknown update precondition: {}", other)),
        }
    }
}

impl fmt::Display for UpdatePrecondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePrecondition::RequireExisting => f.write_str("require-existing"),
            UpdatePrecondition::RejectExisting => f.write_str("reject-existing"),
        }
    }
}

/// Registry of organizations
#[derive(Debug, Clone, Default)]
pub struct OrganizationRegistry {
    policy: AccessPolicy,
    credits: CreditLedger,
    update_precondition: UpdatePrecondition,
}

impl OrganizationRegistry {
    /// Creates a registry enforcing the given access policy
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            credits: CreditLedger::new(policy.clone()),
            policy,
            update_precondition: UpdatePrecondition::default(),
        }
    }

    pub fn with_update_precondition(mut self, precondition: UpdatePrecondition) -> Self {
        self.update_precondition = precondition;
        self
    }

    /// The credit ledger used to provision accounts
    pub fn credits(&self) -> &CreditLedger {
        &self.credits
    }

    /// Returns true if an organization is stored under `id`
    pub async fn exists(&self, store: &dyn LedgerStore, id: &str) -> Result<bool, OrgError> {
        Ok(store.get_state(&organization_key(id)?).await?.is_some())
    }

    /// Registers an organization and opens its credit account
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` unless the caller is super-admin
    /// - `AlreadyExists` if `id` is taken
    /// - `InvalidAmount` if the opening balance is not a decimal `>= 0`
    #[instrument(skip(self, ctx, store, new), fields(tx_id = %ctx.tx_id(), org_id = %new.id))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        new: &NewOrganization,
    ) -> Result<Organization, OrgError> {
        self.policy.gate(ctx).require_super_admin()?;
        if self.exists(store, &new.id).await? {
            return Err(OrgError::AlreadyExists(new.id.clone()));
        }

        let credit = self
            .credits
            .create(ctx, store, &new.id, &new.credit_title, &new.initial_credit)
            .await?;

        let org = Organization::from_new(ctx, new, &credit.id);
        self.store(store, &org).await?;

        info!(credit_id = %credit.id, "Organization registered");
        Ok(org)
    }

    /// Replaces an organization's mutable fields
    ///
    /// The existence check follows the configured [`UpdatePrecondition`].
    #[instrument(skip(self, ctx, store, update), fields(tx_id = %ctx.tx_id(), org_id = %update.id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        update: &OrganizationUpdate,
    ) -> Result<Organization, OrgError> {
        self.policy.gate(ctx).require_super_admin()?;
        update.validate()?;

        let existing = self.load(store, &update.id).await?;
        let mut org = match (self.update_precondition, existing) {
            (UpdatePrecondition::RequireExisting, Some(org)) => org,
            (UpdatePrecondition::RequireExisting, None) => {
                return Err(OrgError::NotFound(update.id.clone()))
            }
            (UpdatePrecondition::RejectExisting, Some(_)) => {
                warn!("Update refused by legacy precondition");
                return Err(OrgError::AlreadyExists(update.id.clone()));
            }
            (UpdatePrecondition::RejectExisting, None) => {
                return Err(OrgError::NotFound(update.id.clone()))
            }
        };

        org.apply_update(ctx, update);
        self.store(store, &org).await?;

        info!("Organization updated");
        Ok(org)
    }

    /// Binds a public key to an organization, once
    ///
    /// # Errors
    ///
    /// Checked in order:
    /// - `PermissionDenied` unless the caller is super-admin
    /// - `UnsupportedKeyType` unless `key_type` is `ecdsa:P-384`
    /// - `InvalidKey` if `key_pem` is not a P-384 SubjectPublicKeyInfo
    /// - `NotFound` if the organization does not exist
    /// - `AlreadyBound` if the organization already has a key
    /// - `KeyTaken` if any organization holds the same key
    ///
    /// The key is stored in canonical PEM form, so differently spelled
    /// copies of one key compare equal.
    ///
    /// The uniqueness check is a query scan. Two transactions binding the
    /// same key to different organizations can both commit, since query
    /// results are not part of the read set.
    #[instrument(skip(self, ctx, store, key_pem), fields(tx_id = %ctx.tx_id()))]
    pub async fn bind_public_key(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        id: &str,
        key_type: &str,
        key_pem: &str,
    ) -> Result<Organization, OrgError> {
        self.policy.gate(ctx).require_super_admin()?;
        ensure_supported_key_type(key_type)?;
        let key_pem = canonical_public_key_pem(key_pem)?;

        let mut org = self
            .load(store, id)
            .await?
            .ok_or_else(|| OrgError::NotFound(id.to_string()))?;
        if org.has_public_key() {
            return Err(OrgError::AlreadyBound(id.to_string()));
        }

        let holders = store
            .query(&QuerySpec::new().where_eq("pubKeyPem", key_pem.as_str()))
            .await?;
        if !holders.is_empty() {
            return Err(OrgError::KeyTaken);
        }

        org.pub_key_type = key_type.to_string();
        org.pub_key_pem = key_pem;
        org.update_tx_timestamp = ctx.tx_timestamp_secs();
        self.store(store, &org).await?;

        info!("Public key bound");
        Ok(org)
    }

    /// Reads an organization
    ///
    /// No authorization beyond existence. A record that does not decode is
    /// reported as `NotFound`.
    pub async fn read(&self, store: &dyn LedgerStore, id: &str) -> Result<Organization, OrgError> {
        let bytes = store
            .get_state(&organization_key(id)?)
            .await?
            .ok_or_else(|| OrgError::NotFound(id.to_string()))?;
        decode(&bytes).map_err(|e| {
            warn!(org_id = id, error = %e, "Stored organization is malformed");
            OrgError::NotFound(id.to_string())
        })
    }

    /// Reads the organization named by the caller's `org.id` attribute
    pub async fn read_caller(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
    ) -> Result<Organization, OrgError> {
        let org_id = self.policy.gate(ctx).caller_org_id()?;
        self.read(store, org_id).await
    }

    /// Lists every organization, oldest first
    ///
    /// Unrestricted: any caller may enumerate organizations.
    pub async fn list(&self, store: &dyn LedgerStore) -> Result<Vec<Organization>, OrgError> {
        let query = QuerySpec::new()
            .where_eq("docType", ORGANIZATION_DOC_TYPE)
            .sort_by("createTxTimestamp", SortOrder::Asc);

        store
            .query(&query)
            .await?
            .iter()
            .map(|record| decode(&record.value).map_err(OrgError::from))
            .collect()
    }

    async fn load(
        &self,
        store: &dyn LedgerStore,
        id: &str,
    ) -> Result<Option<Organization>, OrgError> {
        match store.get_state(&organization_key(id)?).await? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn store(&self, store: &dyn LedgerStore, org: &Organization) -> Result<(), OrgError> {
        store
            .put_state(&organization_key(&org.id)?, encode(org)?)
            .await?;
        Ok(())
    }
}
