//! Rich-query evaluation
//!
//! Evaluates a [`QuerySpec`] against JSON-encoded records the way a
//! CouchDB-backed ledger does: equality selectors, one sort field with
//! CouchDB type collation, and offset bookmarks for pagination.

use std::cmp::Ordering;

use core_kernel::{QueryPage, QueryRecord, QuerySpec, SortOrder, StoreError};
use serde_json::Value;

/// Returns every record matching the selector, in query order
///
/// Records that are not JSON documents never match. Without a sort clause
/// records come back in key order; with one, ties are broken by key.
pub(crate) fn select<'a, I>(records: I, query: &QuerySpec) -> Vec<QueryRecord>
where
    I: IntoIterator<Item = (&'a String, &'a Vec<u8>)>,
{
    let mut matched: Vec<(Value, QueryRecord)> = records
        .into_iter()
        .filter_map(|(key, value)| {
            let document: Value = serde_json::from_slice(value).ok()?;
            query.matches(&document).then(|| {
                (
                    document,
                    QueryRecord {
                        key: key.clone(),
                        value: value.clone(),
                    },
                )
            })
        })
        .collect();

    if let Some(sort) = &query.sort {
        matched.sort_by(|(a_doc, a), (b_doc, b)| {
            let ordering = collate(a_doc.get(&sort.field), b_doc.get(&sort.field));
            let ordering = match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.key.cmp(&b.key))
        });
    }

    matched.into_iter().map(|(_, record)| record).collect()
}

/// Cuts one page out of an ordered result set
///
/// The bookmark is the offset of the first record of the page; an empty
/// bookmark starts from the beginning. A page size of zero returns every
/// remaining record.
pub(crate) fn paginate(
    records: Vec<QueryRecord>,
    page_size: u32,
    bookmark: &str,
) -> Result<QueryPage, StoreError> {
    let offset = if bookmark.is_empty() {
        0
    } else {
        bookmark
            .parse::<usize>()
            .map_err(|_| StoreError::InvalidBookmark(bookmark.to_string()))?
    };

    let total = records.len();
    if offset >= total {
        return Ok(QueryPage::default());
    }

    let limit = if page_size == 0 {
        usize::MAX
    } else {
        page_size as usize
    };
    let end = offset.saturating_add(limit).min(total);

    let bookmark = if end < total {
        end.to_string()
    } else {
        String::new()
    };

    Ok(QueryPage {
        records: records.into_iter().skip(offset).take(end - offset).collect(),
        bookmark,
    })
}

/// CouchDB collation: missing < null < bool < number < string < array < object
fn collate(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => a
                    .as_f64()
                    .partial_cmp(&b.as_f64())
                    .unwrap_or(Ordering::Equal),
            },
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => rank(a).cmp(&rank(b)),
        },
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
