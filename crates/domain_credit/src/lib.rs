//! Credit Domain - Organization credit accounts
//!
//! This crate implements the credit ledger: one non-negative, exact-decimal
//! balance per organization and an append-only log of every change.
//!
//! # Operations
//!
//! | Operation | Authorization | Log entry |
//! |-----------|---------------|-----------|
//! | `create`  | super-admin   | `mint`, titled "Create Credit" |
//! | `mint`    | super-admin   | `mint`  |
//! | `burn`    | super-admin   | `burn`  |
//! | `spend`   | org-admin     | `spend` |
//! | `read`, `list_credit_log` | super-admin or org-admin | none |
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_credit::CreditLedger;
//!
//! let ledger = CreditLedger::new(policy);
//! ledger.create(&ctx, &tx, "ORG1", "Main", "100").await?;
//! let credit = ledger.spend(&ctx, &tx, "ORG1", "ORG1", "30", "Lunch").await?;
//! assert_eq!(credit.amount.to_string(), "70");
//! ```

pub mod audit;
pub mod credit;
pub mod error;
pub mod ledger;
pub mod query;

pub use audit::AuditLog;
pub use credit::{Credit, CreditLogEntry, LogType, CREDIT_DOC_TYPE, CREDIT_LOG_DOC_TYPE};
pub use error::CreditError;
pub use ledger::{CreditLedger, CREATE_CREDIT_TITLE};
pub use query::{credit_log_query, CreditLogPage, DEFAULT_LOG_PAGE_SIZE};
