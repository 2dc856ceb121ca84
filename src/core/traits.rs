//! Store traits consumed by the ledger service
//!
//! This module defines the trait abstractions that let an in-memory store and
//! a future persistent store be swapped without touching `LedgerService`.
//! Both traits are async so that implementations backed by real I/O can
//! suspend; the ledger only ever awaits them, never blocks on them.

use crate::types::{AccountId, Amount, Balance, LedgerError, NewTransaction, TransactionRecord};
use async_trait::async_trait;

/// Trait for the per-account balance store
///
/// Implementations provide atomic single-key reads and writes. They are not
/// expected to offer cross-key transactions; the ledger serializes writers
/// of one account itself.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Read the stored balance of an account, `None` if it was never saved
    async fn find(&self, account: AccountId) -> Result<Option<Balance>, LedgerError>;

    /// Store a new balance for an account and return the committed snapshot
    ///
    /// The store stamps `last_updated` with the commit time and assigns the
    /// next revision (previous revision + 1, or 1 for a new account).
    async fn save(&self, account: AccountId, balance: Amount) -> Result<Balance, LedgerError>;

    /// Snapshot of every stored balance, in no particular order
    async fn all(&self) -> Result<Vec<Balance>, LedgerError>;
}

/// Trait for the append-only transaction history
///
/// Appends are atomic per record. Records are never mutated or deleted.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a record and return it with its assigned id
    async fn append(&self, transaction: NewTransaction) -> Result<TransactionRecord, LedgerError>;

    /// All records of an account, ordered by ascending revision
    async fn list_by_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<TransactionRecord>, LedgerError>;
}
