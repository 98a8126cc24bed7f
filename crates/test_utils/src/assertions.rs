//! Custom Test Assertions
//!
//! Provides assertion helpers for credit records that give more
//! meaningful messages than standard assertions.

use core_kernel::Amount;
use domain_credit::{Credit, CreditLogEntry, LogType};

/// Asserts that an account holds exactly the expected balance
///
/// # Panics
///
/// Panics if `expected` does not parse or the balances differ
pub fn assert_balance(credit: &Credit, expected: &str) {
    let expected = Amount::parse(expected).expect("expected balance must be a decimal");
    assert_eq!(
        credit.amount, expected,
        "Credit {} of {} holds {}, expected {}",
        credit.id, credit.org_id, credit.amount, expected
    );
}

/// Asserts the shape of a log entry
///
/// # Arguments
///
/// * `entry` - The entry to check
/// * `kind` - The expected operation
/// * `magnitude` - The expected amount moved
/// * `balance` - The expected balance snapshot
pub fn assert_log_entry(entry: &CreditLogEntry, kind: LogType, magnitude: &str, balance: &str) {
    assert_eq!(entry.kind, kind, "Entry {} has type {}, expected {}", entry.id, entry.kind, kind);
    assert_single_sided(entry);
    assert_eq!(
        entry.magnitude().to_string(),
        Amount::parse(magnitude).expect("magnitude must be a decimal").to_string(),
        "Entry {} moved {}, expected {}",
        entry.id,
        entry.magnitude(),
        magnitude
    );
    assert_eq!(
        entry.amount.to_string(),
        Amount::parse(balance).expect("balance must be a decimal").to_string(),
        "Entry {} snapshot {}, expected {}",
        entry.id,
        entry.amount,
        balance
    );
}

/// Asserts that only the side matching the entry type can be non-zero
pub fn assert_single_sided(entry: &CreditLogEntry) {
    let (off_side, name) = match entry.kind {
        LogType::Mint => (entry.debit, "debit"),
        LogType::Burn | LogType::Spend => (entry.credit, "credit"),
    };
    assert!(
        off_side.is_zero(),
        "Entry {} of type {} has non-zero {} side {}",
        entry.id,
        entry.kind,
        name,
        off_side
    );
}

/// Asserts that log entries are ordered newest first
pub fn assert_newest_first(entries: &[CreditLogEntry]) {
    for pair in entries.windows(2) {
        assert!(
            pair[0].tx_timestamp >= pair[1].tx_timestamp,
            "Entry {} ({}) listed before newer entry {} ({})",
            pair[0].id,
            pair[0].tx_timestamp,
            pair[1].id,
            pair[1].tx_timestamp
        );
    }
}
