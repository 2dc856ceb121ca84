//! Account ledger service
//!
//! This module provides `LedgerService`, which applies charge and use
//! operations to account balances and records them in the history.
//!
//! # Design
//!
//! Every mutating operation follows the same path:
//!
//! ```text
//! validate account/amount ──► KeyedLock::acquire(account)
//!                                   │
//!                     read balance ─┤ (critical section)
//!                  check + compute ─┤
//!                    save balance ──┘
//!                                   ▼
//!                        guard dropped (lock released)
//!                                   │
//!                                   ▼
//!                      append history record
//! ```
//!
//! Validation runs before locking so invalid requests never contend for an
//! account's lock. The history append runs after the lock is released so
//! the audit write doesn't extend the critical section; the record carries
//! the revision of the transition it describes, which keeps the history in
//! commit order regardless of when the append lands.
//!
//! Once the balance is saved the operation has happened. A history append
//! that fails afterwards is logged at error level and the committed balance
//! is still returned; the missing record shows up as a revision gap.
//!
//! Queries (`get_balance`, `get_history`) never take the lock. They return
//! whatever the stores hold at read time.

use super::key_lock::KeyedLock;
use super::traits::{BalanceStore, HistoryStore};
use super::validation::{validate_account, validate_amount};
use crate::types::{
    AccountId, Amount, Balance, LedgerError, NewTransaction, TransactionKind, TransactionRecord,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Point ledger over a balance store and a history store
///
/// The service is cheap to clone; clones share stores and locks, so all
/// clones serialize on the same per-account locks.
#[derive(Debug)]
pub struct LedgerService<B, H>
where
    B: BalanceStore,
    H: HistoryStore,
{
    /// Current balance per account
    balances: Arc<B>,

    /// Append-only transaction history
    history: Arc<H>,

    /// One lock per account, shared by every clone of the service
    locks: Arc<KeyedLock<AccountId>>,
}

impl<B, H> Clone for LedgerService<B, H>
where
    B: BalanceStore,
    H: HistoryStore,
{
    fn clone(&self) -> Self {
        Self {
            balances: Arc::clone(&self.balances),
            history: Arc::clone(&self.history),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<B, H> LedgerService<B, H>
where
    B: BalanceStore,
    H: HistoryStore,
{
    /// Create a ledger over the given stores
    ///
    /// # Arguments
    ///
    /// * `balances` - Arc-wrapped balance store
    /// * `history` - Arc-wrapped history store
    pub fn new(balances: Arc<B>, history: Arc<H>) -> Self {
        Self {
            balances,
            history,
            locks: Arc::new(KeyedLock::new()),
        }
    }

    /// Current balance of an account
    ///
    /// Returns the zero balance for an account that was never charged.
    ///
    /// # Errors
    ///
    /// * `InvalidAccount` - if `account <= 0`
    pub async fn get_balance(&self, account: AccountId) -> Result<Balance, LedgerError> {
        validate_account(account)?;

        Ok(self
            .balances
            .find(account)
            .await?
            .unwrap_or_else(|| Balance::zero(account)))
    }

    /// Add points to an account
    ///
    /// # Returns
    ///
    /// The committed balance after the charge, even if its history record
    /// could not be appended.
    ///
    /// # Errors
    ///
    /// * `InvalidAccount` - if `account <= 0` (no lock requested)
    /// * `InvalidAmount` - if `amount <= 0` (no lock requested)
    /// * `ArithmeticOverflow` - if the new balance doesn't fit in an `i64`
    #[instrument(level = "debug", skip(self))]
    pub async fn charge(&self, account: AccountId, amount: Amount) -> Result<Balance, LedgerError> {
        validate_account(account)?;
        validate_amount(amount)?;

        let committed = {
            let _guard = self.locks.acquire(account).await;

            let current = self.current_balance(account).await?;
            let updated = current
                .checked_add(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("charge", account))?;

            self.balances.save(account, updated).await?
        };

        self.record(&committed, amount, TransactionKind::Charge).await;

        debug!(
            account,
            amount,
            balance = committed.balance,
            revision = committed.revision,
            "charge committed"
        );
        Ok(committed)
    }

    /// Spend points from an account
    ///
    /// The balance is checked against `amount` while the account lock is
    /// held, so the check and the write can't be split by another operation.
    ///
    /// # Returns
    ///
    /// The committed balance after the use, even if its history record
    /// could not be appended.
    ///
    /// # Errors
    ///
    /// * `InvalidAccount` - if `account <= 0` (no lock requested)
    /// * `InvalidAmount` - if `amount <= 0` (no lock requested)
    /// * `InsufficientBalance` - if the balance is lower than `amount` when
    ///   the lock is granted; the balance is left unchanged
    #[instrument(level = "debug", skip(self))]
    pub async fn use_points(
        &self,
        account: AccountId,
        amount: Amount,
    ) -> Result<Balance, LedgerError> {
        validate_account(account)?;
        validate_amount(amount)?;

        let committed = {
            let _guard = self.locks.acquire(account).await;

            let current = self.current_balance(account).await?;
            if current < amount {
                debug!(account, available = current, requested = amount, "use rejected");
                return Err(LedgerError::insufficient_balance(account, current, amount));
            }

            self.balances.save(account, current - amount).await?
        };

        self.record(&committed, amount, TransactionKind::Use).await;

        debug!(
            account,
            amount,
            balance = committed.balance,
            revision = committed.revision,
            "use committed"
        );
        Ok(committed)
    }

    /// History of an account in commit order
    ///
    /// # Errors
    ///
    /// * `InvalidAccount` - if `account <= 0`
    pub async fn get_history(
        &self,
        account: AccountId,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        validate_account(account)?;

        self.history.list_by_account(account).await
    }

    /// Snapshot of every stored balance, sorted by account id
    pub async fn balances(&self) -> Result<Vec<Balance>, LedgerError> {
        let mut balances = self.balances.all().await?;
        balances.sort_by_key(|balance| balance.account);
        Ok(balances)
    }

    /// Number of accounts that currently have a lock allocated
    pub fn tracked_locks(&self) -> usize {
        self.locks.len()
    }

    /// Release the locks of accounts nobody is operating on
    ///
    /// Never evicts a lock that is held or waited for. Returns how many
    /// locks were dropped.
    pub fn prune_idle_locks(&self) -> usize {
        let pruned = self.locks.prune_idle();
        debug!(pruned, remaining = self.locks.len(), "pruned idle account locks");
        pruned
    }

    /// Stored balance amount, zero for an unknown account
    async fn current_balance(&self, account: AccountId) -> Result<Amount, LedgerError> {
        Ok(self
            .balances
            .find(account)
            .await?
            .map_or(0, |balance| balance.balance))
    }

    /// Append the history record of a committed transition
    ///
    /// The balance is already committed, so a failed append can't undo the
    /// operation. It is logged with the revision whose record is missing.
    async fn record(&self, committed: &Balance, amount: Amount, kind: TransactionKind) {
        let appended = self
            .history
            .append(NewTransaction {
                account: committed.account,
                amount,
                kind,
                timestamp: committed.last_updated,
                revision: committed.revision,
            })
            .await;

        if let Err(e) = appended {
            error!(
                account = committed.account,
                revision = committed.revision,
                %kind,
                error = %e,
                "history append failed after commit"
            );
        }
    }
}
