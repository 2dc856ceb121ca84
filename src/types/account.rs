//! Account-related types for the point ledger
//!
//! This module defines the `Balance` snapshot returned by every ledger
//! operation, along with the identifier and amount aliases.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Account identifier
///
/// Signed so that non-positive ids coming from callers can be represented
/// and rejected by validation with an `InvalidAccount` error.
pub type AccountId = i64;

/// Point amount
///
/// Balances are never negative; operation amounts must be strictly positive.
pub type Amount = i64;

/// Committed balance of a single account
///
/// Returned by `get_balance`, `charge` and `use_points`. A `Balance` is a
/// snapshot: it reflects the store at the moment it was read or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    /// The account this balance belongs to
    pub account: AccountId,

    /// Current point balance, always `>= 0`
    pub balance: Amount,

    /// Time of the last committed transition
    ///
    /// The Unix epoch for an account that has never been charged.
    pub last_updated: DateTime<Utc>,

    /// Number of committed transitions for this account
    ///
    /// Assigned by the balance store: 0 for an untouched account, 1 after the
    /// first save, incremented by one on every subsequent save. History
    /// records carry the revision of the transition that produced them.
    pub revision: u64,
}

impl Balance {
    /// Create the zero balance an account has before its first charge
    ///
    /// # Returns
    ///
    /// A Balance with:
    /// - balance = 0
    /// - last_updated = Unix epoch
    /// - revision = 0
    pub fn zero(account: AccountId) -> Self {
        Balance {
            account,
            balance: 0,
            last_updated: DateTime::<Utc>::default(),
            revision: 0,
        }
    }
}
