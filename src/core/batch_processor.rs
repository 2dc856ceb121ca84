//! Concurrent batch execution of ledger operations
//!
//! `BatchProcessor` submits every operation of a batch to the ledger at the
//! same time, one tokio task per operation. Operations on the same account
//! contend for that account's lock and are applied one at a time; operations
//! on different accounts proceed in parallel.
//!
//! # Ordering
//!
//! Within a batch, operations on one account are applied in lock-arrival
//! order, which need not match their order in the input. Batches themselves
//! are processed one after another by the caller, so an operation never
//! overtakes one from an earlier batch.
//!
//! # Thread Safety
//!
//! The processor is cloneable and shares its `LedgerService` (and therefore
//! its stores and locks) with every clone.

use super::ledger::LedgerService;
use super::traits::{BalanceStore, HistoryStore};
use crate::types::{Balance, LedgerError, OperationRecord, OperationType};
use tracing::error;

/// Outcome of a single operation
#[derive(Debug, Clone)]
pub struct OperationResult {
    /// The operation that was submitted
    pub record: OperationRecord,

    /// The committed balance, or the reason the operation was rejected
    pub result: Result<Balance, LedgerError>,
}

/// Runs batches of operations against a shared ledger
#[derive(Debug)]
pub struct BatchProcessor<B, H>
where
    B: BalanceStore,
    H: HistoryStore,
{
    ledger: LedgerService<B, H>,
}

impl<B, H> Clone for BatchProcessor<B, H>
where
    B: BalanceStore,
    H: HistoryStore,
{
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
        }
    }
}

impl<B, H> BatchProcessor<B, H>
where
    B: BalanceStore + 'static,
    H: HistoryStore + 'static,
{
    pub fn new(ledger: LedgerService<B, H>) -> Self {
        Self { ledger }
    }

    /// The ledger this processor submits to
    pub fn ledger(&self) -> &LedgerService<B, H> {
        &self.ledger
    }

    /// Apply one operation to the ledger
    pub async fn apply(&self, record: OperationRecord) -> OperationResult {
        let result = match record.op_type {
            OperationType::Charge => self.ledger.charge(record.account, record.amount).await,
            OperationType::Use => self.ledger.use_points(record.account, record.amount).await,
        };

        OperationResult { record, result }
    }

    /// Submit every operation in `batch` concurrently and wait for all of them
    ///
    /// # Returns
    ///
    /// One `OperationResult` per operation, in input order. An operation
    /// whose task panicked has no result and is logged instead.
    pub async fn process_batch(&self, batch: Vec<OperationRecord>) -> Vec<OperationResult> {
        let tasks: Vec<_> = batch
            .into_iter()
            .map(|record| {
                let processor = self.clone();
                tokio::spawn(async move { processor.apply(record).await })
            })
            .collect();

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(result) => results.push(result),
                Err(e) => error!(error = %e, "operation task panicked"),
            }
        }

        results
    }
}
