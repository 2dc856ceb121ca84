//! Transaction-related types for the point ledger
//!
//! This module defines the history record kinds and the records kept by the
//! history store for every committed charge or use.

use super::account::{AccountId, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// History record identifier, assigned by the history store
pub type TransactionId = u64;

/// Kind of balance transition recorded in the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Points were added to the balance
    Charge,

    /// Points were spent from the balance
    Use,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Charge => f.write_str("charge"),
            TransactionKind::Use => f.write_str("use"),
        }
    }
}

/// A history entry that has not been appended yet
///
/// Built by the ledger service after the balance transition committed; the
/// history store turns it into a `TransactionRecord` by assigning an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub account: AccountId,
    pub amount: Amount,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub revision: u64,
}

/// Immutable history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// Identifier assigned by the history store
    pub id: TransactionId,

    /// The account whose balance changed
    pub account: AccountId,

    /// Points charged or used, always positive
    pub amount: Amount,

    /// Whether the transition was a charge or a use
    pub kind: TransactionKind,

    /// Commit time of the balance transition
    pub timestamp: DateTime<Utc>,

    /// Revision of the balance transition that produced this record
    ///
    /// Records of one account are listed in ascending revision order, which
    /// is the order their balance transitions committed in.
    pub revision: u64,
}

impl TransactionRecord {
    /// Build a stored record from a pending one and its assigned id
    pub fn from_new(id: TransactionId, new: NewTransaction) -> Self {
        TransactionRecord {
            id,
            account: new.account,
            amount: new.amount,
            kind: new.kind,
            timestamp: new.timestamp,
            revision: new.revision,
        }
    }
}
