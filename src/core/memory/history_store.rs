//! Thread-safe in-memory history store
//!
//! This module provides `InMemoryHistoryStore`, a `DashMap`-backed
//! implementation of `HistoryStore`.
//!
//! # Ordering
//!
//! The ledger appends history after releasing the account lock, so two
//! appends for the same account may finish out of commit order. Each record
//! carries the revision of the balance transition that produced it, and the
//! store inserts it at its revision position. Listing an account therefore
//! always yields commit order; a concurrent listing may miss a record whose
//! append is still in flight but never sees a partial one.
//!
//! Records stamped at or before the Unix epoch are refused with
//! `InvalidTimestamp` and consume no id.

use super::simulate_latency;
use crate::core::traits::HistoryStore;
use crate::core::validation::validate_timestamp;
use crate::types::{AccountId, LedgerError, NewTransaction, TransactionId, TransactionRecord};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// History store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    /// Records by account id, sorted by revision
    histories: DashMap<AccountId, Vec<TransactionRecord>>,

    /// Last assigned record id
    last_id: AtomicU64,

    /// Delay awaited before every call
    latency: Option<Duration>,
}

impl InMemoryHistoryStore {
    /// Create an empty store that answers immediately
    pub fn new() -> Self {
        Self {
            histories: DashMap::new(),
            last_id: AtomicU64::new(0),
            latency: None,
        }
    }

    /// Create an empty store that waits `latency` before every call
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::new()
        }
    }

    /// Total number of records across all accounts
    pub fn record_count(&self) -> usize {
        self.histories.iter().map(|entry| entry.value().len()).sum()
    }

    fn next_id(&self) -> TransactionId {
        self.last_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, transaction: NewTransaction) -> Result<TransactionRecord, LedgerError> {
        simulate_latency(self.latency).await;
        validate_timestamp(transaction.account, transaction.timestamp)?;

        let record = TransactionRecord::from_new(self.next_id(), transaction);

        let mut records = self.histories.entry(record.account).or_default();
        let position = records.partition_point(|existing| existing.revision <= record.revision);
        records.insert(position, record.clone());

        Ok(record)
    }

    async fn list_by_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        simulate_latency(self.latency).await;

        Ok(self
            .histories
            .get(&account)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionKind;
    use chrono::Utc;
    use std::sync::Arc;

    fn new_transaction(account: AccountId, amount: i64, revision: u64) -> NewTransaction {
        NewTransaction {
            account,
            amount,
            kind: TransactionKind::Charge,
            timestamp: Utc::now(),
            revision,
        }
    }

    #[tokio::test]
    async fn test_append_rejects_epoch_timestamp() {
        let store = InMemoryHistoryStore::new();
        let mut transaction = new_transaction(1, 10, 1);
        transaction.timestamp = chrono::DateTime::<Utc>::default();

        assert_eq!(
            store.append(transaction).await,
            Err(LedgerError::InvalidTimestamp { account: 1 })
        );
        assert_eq!(store.record_count(), 0);

        let record = store.append(new_transaction(1, 10, 1)).await.unwrap();
        assert_eq!(record.id, 1);
    }

    #[tokio::test]
    async fn test_list_unknown_account_is_empty() {
        let store = InMemoryHistoryStore::new();

        assert!(store.list_by_account(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = InMemoryHistoryStore::new();

        let first = store.append(new_transaction(1, 100, 1)).await.unwrap();
        let second = store.append(new_transaction(2, 50, 1)).await.unwrap();
        let third = store.append(new_transaction(1, 30, 2)).await.unwrap();

        assert_eq!((first.id, second.id, third.id), (1, 2, 3));
        assert_eq!(store.record_count(), 3);
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_account() {
        let store = InMemoryHistoryStore::new();

        store.append(new_transaction(1, 100, 1)).await.unwrap();
        store.append(new_transaction(2, 200, 1)).await.unwrap();

        let records = store.list_by_account(2).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 200);
    }

    #[tokio::test]
    async fn test_late_append_is_listed_in_revision_order() {
        let store = InMemoryHistoryStore::new();

        // Revision 2 finished appending before revision 1
        store.append(new_transaction(1, 20, 2)).await.unwrap();
        store.append(new_transaction(1, 30, 3)).await.unwrap();
        store.append(new_transaction(1, 10, 1)).await.unwrap();

        let revisions: Vec<u64> = store
            .list_by_account(1)
            .await
            .unwrap()
            .iter()
            .map(|record| record.revision)
            .collect();
        assert_eq!(revisions, vec![1, 2, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let mut tasks = Vec::new();

        for revision in 1..=100u64 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.append(new_transaction(1, 1, revision)).await.unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let records = store.list_by_account(1).await.unwrap();
        assert_eq!(records.len(), 100);
        assert!(records.windows(2).all(|pair| pair[0].revision < pair[1].revision));
    }
}
