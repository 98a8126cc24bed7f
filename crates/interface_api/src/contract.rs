//! Ledger contract
//!
//! Routes decoded requests to the organization registry and the credit
//! ledger. The contract is stateless; the store handle of the current
//! transaction is passed to every call.

use core_kernel::{ErrorCode, LedgerStore, RequestContext, StoreError};
use domain_credit::{Credit, CreditError, CreditLedger, CreditLogEntry, CreditLogPage};
use domain_org::{OrgError, Organization, OrganizationRegistry};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::request::Request;

/// Errors returned by an invocation
#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Org(#[from] OrgError),

    #[error(transparent)]
    Credit(#[from] CreditError),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid arguments for {function}: {message}")]
    InvalidArguments { function: String, message: String },

    /// The transaction could not be committed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ContractError {
    pub fn invalid_arguments(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Returns the taxonomy code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ContractError::Org(e) => e.code(),
            ContractError::Credit(e) => e.code(),
            ContractError::UnknownFunction(_) => ErrorCode::UnknownFunction,
            ContractError::InvalidArguments { .. } => ErrorCode::InvalidArguments,
            ContractError::Store(e) => e.code(),
        }
    }
}

/// Payload of a successful invocation
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Serialized as `null`
    Empty,
    Flag(bool),
    Organization(Box<Organization>),
    Organizations(Vec<Organization>),
    Credit(Credit),
    CreditLog(Vec<CreditLogEntry>),
    CreditLogPage(CreditLogPage),
}

/// Dispatcher over every ledger operation
#[derive(Debug, Clone, Default)]
pub struct Contract {
    registry: OrganizationRegistry,
}

impl Contract {
    pub fn new(registry: OrganizationRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &OrganizationRegistry {
        &self.registry
    }

    pub fn credits(&self) -> &CreditLedger {
        self.registry.credits()
    }

    /// Executes one request against the store of the current transaction
    #[instrument(skip_all, fields(tx_id = %ctx.tx_id(), function = request.function()))]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        store: &dyn LedgerStore,
        request: Request,
    ) -> Result<Response, ContractError> {
        let caller_role = self.credits().policy().gate(ctx).caller_role();
        debug!(msp_id = %ctx.identity().msp_id(), caller_role, "Executing request");

        let registry = &self.registry;
        let credits = self.credits();

        let response = match request {
            Request::InitLedger => Response::Empty,
            Request::OrgExists { id } => Response::Flag(registry.exists(store, &id).await?),
            Request::CreateOrg(new) => {
                Response::Organization(Box::new(registry.create(ctx, store, &new).await?))
            }
            Request::UpdateOrg(update) => {
                Response::Organization(Box::new(registry.update(ctx, store, &update).await?))
            }
            Request::SetOrgPublicKey {
                id,
                key_type,
                key_pem,
            } => Response::Organization(Box::new(
                registry
                    .bind_public_key(ctx, store, &id, &key_type, &key_pem)
                    .await?,
            )),
            Request::ReadOrg { id } => Response::Organization(Box::new(registry.read(store, &id).await?)),
            Request::ReadMyOrg => {
                Response::Organization(Box::new(registry.read_caller(ctx, store).await?))
            }
            Request::ListOrgs => Response::Organizations(registry.list(store).await?),
            Request::CreditExists { credit_id, org_id } => {
                Response::Flag(credits.exists(ctx, store, &credit_id, &org_id).await?)
            }
            Request::CreateCredit {
                org_id,
                title,
                amount,
            } => Response::Credit(credits.create(ctx, store, &org_id, &title, &amount).await?),
            Request::MintCredit(change) => Response::Credit(
                credits
                    .mint(ctx, store, &change.credit_id, &change.org_id, &change.amount, &change.title)
                    .await?,
            ),
            Request::BurnCredit(change) => Response::Credit(
                credits
                    .burn(ctx, store, &change.credit_id, &change.org_id, &change.amount, &change.title)
                    .await?,
            ),
            Request::SpendCredit(change) => Response::Credit(
                credits
                    .spend(ctx, store, &change.credit_id, &change.org_id, &change.amount, &change.title)
                    .await?,
            ),
            Request::ReadCredit { credit_id, org_id } => {
                Response::Credit(credits.read(ctx, store, &credit_id, &org_id).await?)
            }
            Request::ListCreditLog { credit_id, org_id } => Response::CreditLog(
                credits
                    .list_credit_log(ctx, store, &credit_id, &org_id)
                    .await?,
            ),
            Request::ListCreditLogPage {
                credit_id,
                org_id,
                page_size,
                bookmark,
            } => Response::CreditLogPage(
                credits
                    .list_credit_log_page(ctx, store, &credit_id, &org_id, page_size, &bookmark)
                    .await?,
            ),
        };
        Ok(response)
    }
}
