//! Credit ledger state machine
//!
//! This module applies balance changes to credit accounts. Every operation
//! runs inside one host transaction and follows the same shape:
//!
//! 1. Authorization gate
//! 2. Argument validation
//! 3. Reads through composite keys
//! 4. Balance write
//! 5. Credit log append
//!
//! A failure at any step returns before the first write is staged, so a
//! failed operation leaves no trace in the store.

use core_kernel::record::{decode, encode};
use core_kernel::{credit_key, AccessPolicy, Amount, LedgerStore, RequestContext};
use tracing::{info, instrument};

use crate::audit::AuditLog;
use crate::credit::{Credit, LogType};
use crate::error::CreditError;
use crate::query::{credit_log_query, CreditLogPage, DEFAULT_LOG_PAGE_SIZE};

/// Title of the entry written when an account is created
pub const CREATE_CREDIT_TITLE: &str = "Create Credit";

/// Operations on organization credit accounts
///
/// The ledger holds no state of its own; every call receives the store
/// handle of the enclosing transaction.
///
/// # Invariants
///
/// - A stored balance is never negative
/// - Each successful mutation writes exactly one credit log entry
#[derive(Debug, Clone, Default)]
pub struct CreditLedger {
    policy: AccessPolicy,
}

impl CreditLedger {
    /// Creates a ledger enforcing the given access policy
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Returns true if the account exists
    ///
    /// Requires super-admin.
    #[instrument(skip(self, ctx, store), fields(tx_id = %ctx.tx_id()))]
    pub async fn exists(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        credit_id: &str,
        org_id: &str,
    ) -> Result<bool, CreditError> {
        self.policy.gate(ctx).require_super_admin()?;
        Ok(self.load(store, credit_id, org_id).await?.is_some())
    }

    /// Opens the account of an organization
    ///
    /// The account id is the organization id. The opening balance is logged
    /// as a `mint` entry titled "Create Credit".
    ///
    /// # Arguments
    ///
    /// * `org_id` - The owning organization
    /// * `title` - Label of the account
    /// * `initial_amount` - Opening balance, a decimal string `>= 0`
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` unless the caller is super-admin
    /// - `AlreadyExists` if the organization already has an account
    /// - `InvalidAmount` if `initial_amount` is not a non-negative decimal
    #[instrument(skip(self, ctx, store), fields(tx_id = %ctx.tx_id()))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        org_id: &str,
        title: &str,
        initial_amount: &str,
    ) -> Result<Credit, CreditError> {
        self.policy.gate(ctx).require_super_admin()?;

        let credit_id = org_id;
        if self.load(store, credit_id, org_id).await?.is_some() {
            return Err(CreditError::already_exists(credit_id, org_id));
        }
        let amount = Amount::parse_non_negative(initial_amount)?;
        AuditLog::ensure_vacant(ctx, store).await?;

        let credit = Credit::new(ctx, credit_id, org_id, title, amount);
        self.store(store, &credit).await?;
        AuditLog::append(ctx, store, &credit, CREATE_CREDIT_TITLE, LogType::Mint, amount).await?;

        info!(credit_id, amount = %credit.amount, "Credit created");
        Ok(credit)
    }

    /// Adds to an account balance
    ///
    /// Requires super-admin. `amount` must be a decimal `> 0`.
    #[instrument(skip(self, ctx, store), fields(tx_id = %ctx.tx_id()))]
    pub async fn mint(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        credit_id: &str,
        org_id: &str,
        amount: &str,
        title: &str,
    ) -> Result<Credit, CreditError> {
        self.policy.gate(ctx).require_super_admin()?;
        self.apply(ctx, store, credit_id, org_id, amount, title, LogType::Mint)
            .await
    }

    /// Removes from an account balance
    ///
    /// Requires super-admin. Fails with `InsufficientBalance` if `amount`
    /// exceeds the balance.
    #[instrument(skip(self, ctx, store), fields(tx_id = %ctx.tx_id()))]
    pub async fn burn(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        credit_id: &str,
        org_id: &str,
        amount: &str,
        title: &str,
    ) -> Result<Credit, CreditError> {
        self.policy.gate(ctx).require_super_admin()?;
        self.apply(ctx, store, credit_id, org_id, amount, title, LogType::Burn)
            .await
    }

    /// Self-service debit by an admin of the owning organization
    ///
    /// Same arithmetic and failures as [`CreditLedger::burn`].
    #[instrument(skip(self, ctx, store), fields(tx_id = %ctx.tx_id()))]
    pub async fn spend(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        credit_id: &str,
        org_id: &str,
        amount: &str,
        title: &str,
    ) -> Result<Credit, CreditError> {
        self.policy.gate(ctx).require_org_admin(org_id)?;
        self.apply(ctx, store, credit_id, org_id, amount, title, LogType::Spend)
            .await
    }

    /// Reads an account
    ///
    /// Requires super-admin or org-admin of `org_id`.
    pub async fn read(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        credit_id: &str,
        org_id: &str,
    ) -> Result<Credit, CreditError> {
        self.policy.gate(ctx).require_super_admin_or_org_admin(org_id)?;
        self.load(store, credit_id, org_id)
            .await?
            .ok_or_else(|| CreditError::not_found(credit_id, org_id))
    }

    /// Lists the newest entries of an account's log
    ///
    /// Returns at most one page of [`DEFAULT_LOG_PAGE_SIZE`] entries,
    /// newest first; use [`CreditLedger::list_credit_log_page`] to walk
    /// older entries.
    pub async fn list_credit_log(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        credit_id: &str,
        org_id: &str,
    ) -> Result<Vec<crate::credit::CreditLogEntry>, CreditError> {
        let page = self
            .list_credit_log_page(ctx, store, credit_id, org_id, DEFAULT_LOG_PAGE_SIZE, "")
            .await?;
        Ok(page.entries)
    }

    /// Lists one page of an account's log, newest first
    ///
    /// Requires super-admin or org-admin of `org_id`, and the account must
    /// exist.
    ///
    /// # Arguments
    ///
    /// * `page_size` - Maximum number of entries
    /// * `bookmark` - Cursor of the previous page, empty for the first
    #[instrument(skip(self, ctx, store), fields(tx_id = %ctx.tx_id()))]
    pub async fn list_credit_log_page(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        credit_id: &str,
        org_id: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<CreditLogPage, CreditError> {
        let credit = self.read(ctx, store, credit_id, org_id).await?;
        let query = credit_log_query(&credit.id, &credit.org_id);
        let page = store.query_paginated(&query, page_size, bookmark).await?;
        CreditLogPage::try_from(page)
    }

    #[allow(clippy::too_many_arguments)]
    async fn apply(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        credit_id: &str,
        org_id: &str,
        amount: &str,
        title: &str,
        kind: LogType,
    ) -> Result<Credit, CreditError> {
        let delta = Amount::parse_positive(amount)?;
        let mut credit = self
            .load(store, credit_id, org_id)
            .await?
            .ok_or_else(|| CreditError::not_found(credit_id, org_id))?;

        let balance = match kind {
            LogType::Mint => credit.amount.checked_add(delta)?,
            LogType::Burn | LogType::Spend => {
                if delta > credit.amount {
                    return Err(CreditError::InsufficientBalance {
                        credit_id: credit.id,
                        requested: delta,
                        available: credit.amount,
                    });
                }
                credit.amount.checked_sub(delta)?
            }
        };
        let balance = balance.require_non_negative()?;
        AuditLog::ensure_vacant(ctx, store).await?;

        credit.amount = balance;
        credit.tx_timestamp = ctx.tx_timestamp_secs();
        self.store(store, &credit).await?;
        AuditLog::append(ctx, store, &credit, title, kind, delta).await?;

        info!(credit_id, kind = %kind, delta = %delta, balance = %credit.amount, "Credit balance changed");
        Ok(credit)
    }

    async fn load(
        &self,
        store: &dyn LedgerStore,
        credit_id: &str,
        org_id: &str,
    ) -> Result<Option<Credit>, CreditError> {
        match store.get_state(&credit_key(credit_id, org_id)?).await? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn store(&self, store: &dyn LedgerStore, credit: &Credit) -> Result<(), CreditError> {
        store
            .put_state(&credit_key(&credit.id, &credit.org_id)?, encode(credit)?)
            .await?;
        Ok(())
    }
}
