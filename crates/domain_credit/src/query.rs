//! Credit log queries

use core_kernel::record::decode;
use core_kernel::{QueryPage, QueryRecord, QuerySpec, SortOrder};
use serde::Serialize;

use crate::credit::{CreditLogEntry, CREDIT_LOG_DOC_TYPE};
use crate::error::CreditError;

/// Page size of the default credit log listing
pub const DEFAULT_LOG_PAGE_SIZE: u32 = 100;

/// Selects the log entries of one account, newest first
pub fn credit_log_query(credit_id: &str, org_id: &str) -> QuerySpec {
    QuerySpec::new()
        .where_eq("docType", CREDIT_LOG_DOC_TYPE)
        .where_eq("creditId", credit_id)
        .where_eq("orgId", org_id)
        .sort_by("txTimestamp", SortOrder::Desc)
}

/// One page of credit log entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditLogPage {
    pub entries: Vec<CreditLogEntry>,
    /// Resumes after the last entry; empty once exhausted
    pub bookmark: String,
}

impl TryFrom<QueryPage> for CreditLogPage {
    type Error = CreditError;

    fn try_from(page: QueryPage) -> Result<Self, Self::Error> {
        Ok(Self {
            entries: decode_entries(page.records)?,
            bookmark: page.bookmark,
        })
    }
}

/// Decodes query records, failing on the first malformed one
pub fn decode_entries(records: Vec<QueryRecord>) -> Result<Vec<CreditLogEntry>, CreditError> {
    records
        .iter()
        .map(|record| decode(&record.value).map_err(CreditError::from))
        .collect()
}
