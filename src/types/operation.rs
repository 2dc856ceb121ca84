//! Input operation types
//!
//! Operations are what the CLI replays against the ledger: one row of the
//! input CSV becomes one `OperationRecord`.

use super::account::{AccountId, Amount};

/// Mutating operations accepted in input files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    /// Add points to an account
    Charge,

    /// Spend points from an account; rejected when the balance is too low
    Use,
}

/// Input operation record from CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    /// The operation to apply
    pub op_type: OperationType,

    /// Target account, validated by the ledger (not by the reader)
    pub account: AccountId,

    /// Points to charge or use, validated by the ledger
    pub amount: Amount,
}
