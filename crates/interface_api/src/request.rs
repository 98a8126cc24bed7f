//! Invocation decoding
//!
//! Callers name an operation and pass positional string arguments. They are
//! decoded once into a [`Request`], which the contract matches exhaustively.

use domain_org::{NewOrganization, OrganizationUpdate};

use crate::contract::ContractError;

/// Arguments shared by mint, burn and spend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditChange {
    pub credit_id: String,
    pub org_id: String,
    /// Decimal string `> 0`
    pub amount: String,
    pub title: String,
}

/// A decoded ledger invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    InitLedger,
    OrgExists {
        id: String,
    },
    CreateOrg(NewOrganization),
    UpdateOrg(OrganizationUpdate),
    SetOrgPublicKey {
        id: String,
        key_type: String,
        key_pem: String,
    },
    ReadOrg {
        id: String,
    },
    ReadMyOrg,
    ListOrgs,
    CreditExists {
        credit_id: String,
        org_id: String,
    },
    CreateCredit {
        org_id: String,
        title: String,
        amount: String,
    },
    MintCredit(CreditChange),
    BurnCredit(CreditChange),
    SpendCredit(CreditChange),
    ReadCredit {
        credit_id: String,
        org_id: String,
    },
    ListCreditLog {
        credit_id: String,
        org_id: String,
    },
    ListCreditLogPage {
        credit_id: String,
        org_id: String,
        page_size: u32,
        bookmark: String,
    },
}

impl Request {
    /// Decodes a function name and its positional arguments
    ///
    /// # Errors
    ///
    /// - `UnknownFunction` if no operation has this name
    /// - `InvalidArguments` on wrong arity or an unparsable flag or page size
    pub fn decode(function: &str, args: &[String]) -> Result<Self, ContractError> {
        let request = match function {
            "InitLedger" => {
                let [] = arguments(function, args)?;
                Request::InitLedger
            }
            "OrgExists" => {
                let [id] = arguments(function, args)?;
                Request::OrgExists { id }
            }
            "CreateOrg" => {
                let [id, name, desc, institution_id, institution_name, logo_url, initial_credit, credit_title, is_active] =
                    arguments(function, args)?;
                Request::CreateOrg(NewOrganization {
                    id,
                    name,
                    desc,
                    institution_id,
                    institution_name,
                    logo_url,
                    initial_credit,
                    credit_title,
                    is_active: flag(function, &is_active)?,
                })
            }
            "UpdateOrg" => {
                let [id, name, desc, email, institution_id, institution_name, logo_url, is_active] =
                    arguments(function, args)?;
                Request::UpdateOrg(OrganizationUpdate {
                    id,
                    name,
                    desc,
                    email: Some(email).filter(|email| !email.is_empty()),
                    institution_id,
                    institution_name,
                    logo_url,
                    is_active: flag(function, &is_active)?,
                })
            }
            "SetOrgPublicKey" => {
                let [id, key_type, key_pem] = arguments(function, args)?;
                Request::SetOrgPublicKey {
                    id,
                    key_type,
                    key_pem,
                }
            }
            "ReadOrg" => {
                let [id] = arguments(function, args)?;
                Request::ReadOrg { id }
            }
            "ReadMyOrg" => {
                let [] = arguments(function, args)?;
                Request::ReadMyOrg
            }
            "ListOrgs" => {
                let [] = arguments(function, args)?;
                Request::ListOrgs
            }
            "CreditExists" => {
                let [credit_id, org_id] = arguments(function, args)?;
                Request::CreditExists { credit_id, org_id }
            }
            "CreateCredit" => {
                let [org_id, title, amount] = arguments(function, args)?;
                Request::CreateCredit {
                    org_id,
                    title,
                    amount,
                }
            }
            "MintCredit" => Request::MintCredit(credit_change(function, args)?),
            "BurnCredit" => Request::BurnCredit(credit_change(function, args)?),
            "SpendCredit" => Request::SpendCredit(credit_change(function, args)?),
            "ReadCredit" => {
                let [credit_id, org_id] = arguments(function, args)?;
                Request::ReadCredit { credit_id, org_id }
            }
            // Listing functions take the organization first
            "ListCreditLog" => {
                let [org_id, credit_id] = arguments(function, args)?;
                Request::ListCreditLog { credit_id, org_id }
            }
            "ListCreditLogPage" => {
                let [org_id, credit_id, page_size, bookmark] = arguments(function, args)?;
                let page_size = page_size.parse::<u32>().map_err(|_| {
                    ContractError::invalid_arguments(
                        function,
                        format!("page size {:?} is not a non-negative integer", page_size),
                    )
                })?;
                Request::ListCreditLogPage {
                    credit_id,
                    org_id,
                    page_size,
                    bookmark,
                }
            }
            other => return Err(ContractError::UnknownFunction(other.to_string())),
        };
        Ok(request)
    }

    /// The function name this request was decoded from
    pub fn function(&self) -> &'static str {
        match self {
            Request::InitLedger => "InitLedger",
            Request::OrgExists { .. } => "OrgExists",
            Request::CreateOrg(_) => "CreateOrg",
            Request::UpdateOrg(_) => "UpdateOrg",
            Request::SetOrgPublicKey { .. } => "SetOrgPublicKey",
            Request::ReadOrg { .. } => "ReadOrg",
            Request::ReadMyOrg => "ReadMyOrg",
            Request::ListOrgs => "ListOrgs",
            Request::CreditExists { .. } => "CreditExists",
            Request::CreateCredit { .. } => "CreateCredit",
            Request::MintCredit(_) => "MintCredit",
            Request::BurnCredit(_) => "BurnCredit",
            Request::SpendCredit(_) => "SpendCredit",
            Request::ReadCredit { .. } => "ReadCredit",
            Request::ListCreditLog { .. } => "ListCreditLog",
            Request::ListCreditLogPage { .. } => "ListCreditLogPage",
        }
    }
}

fn arguments<const N: usize>(function: &str, args: &[String]) -> Result<[String; N], ContractError> {
    let args: &[String; N] = args.try_into().map_err(|_| {
        ContractError::invalid_arguments(
            function,
            format!("expected {} arguments, got {}", N, args.len()),
        )
    })?;
    Ok(args.clone())
}

fn credit_change(function: &str, args: &[String]) -> Result<CreditChange, ContractError> {
    let [credit_id, org_id, amount, title] = arguments(function, args)?;
    Ok(CreditChange {
        credit_id,
        org_id,
        amount,
        title,
    })
}

fn flag(function: &str, value: &str) -> Result<bool, ContractError> {
    value.parse::<bool>().map_err(|_| {
        ContractError::invalid_arguments(function, format!("{:?} is not true or false", value))
    })
}
