//! Property-Based Test Generators
//!
//! Provides proptest strategies for amounts and ledger operation sequences.

use core_kernel::Amount;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// A balance change applied in a generated sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOp {
    Mint(Amount),
    Burn(Amount),
    Spend(Amount),
}

/// Strategy for strictly positive amounts with up to six fractional digits
pub fn positive_amount_strategy() -> impl Strategy<Value = Amount> {
    (1i64..10_000_000_000i64, 0u32..7u32)
        .prop_map(|(mantissa, scale)| Amount::new(Decimal::new(mantissa, scale)))
}

/// Strategy for opening balances, zero included
pub fn opening_balance_strategy() -> impl Strategy<Value = Amount> {
    prop_oneof![Just(Amount::ZERO), positive_amount_strategy()]
}

/// Strategy for strings that are not valid positive amounts
pub fn invalid_amount_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("0".to_string()),
        Just("0.000".to_string()),
        Just("-1".to_string()),
        Just("1e3".to_string()),
        Just(String::new()),
        Just("NaN".to_string()),
        "[a-z]{1,8}",
        (1i64..1_000_000i64).prop_map(|n| format!("-{}", n)),
    ]
}

/// Strategy for a single balance change
pub fn ledger_op_strategy() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        positive_amount_strategy().prop_map(LedgerOp::Mint),
        positive_amount_strategy().prop_map(LedgerOp::Burn),
        positive_amount_strategy().prop_map(LedgerOp::Spend),
    ]
}

/// Strategy for sequences of balance changes
pub fn ledger_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
    prop::collection::vec(ledger_op_strategy(), 1..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn positive_amounts_are_positive(amount in positive_amount_strategy()) {
            prop_assert!(amount.is_positive());
        }

        #[test]
        fn invalid_amounts_never_parse_positive(input in invalid_amount_strategy()) {
            prop_assert!(Amount::parse_positive(&input).is_err());
        }

        #[test]
        fn op_sequences_are_non_empty(ops in ledger_ops_strategy(8)) {
            prop_assert!(!ops.is_empty());
            prop_assert!(ops.len() <= 8);
        }
    }
}
