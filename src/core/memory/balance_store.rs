//! Thread-safe in-memory balance store
//!
//! This module provides `InMemoryBalanceStore`, a `DashMap`-backed
//! implementation of `BalanceStore`.
//!
//! # Thread Safety
//!
//! Single-key reads and writes are atomic through DashMap's per-shard
//! locking. The store does not serialize read-modify-write sequences; that is
//! the ledger's job, so callers that skip the ledger's account lock can lose
//! updates.

use super::simulate_latency;
use crate::core::traits::BalanceStore;
use crate::types::{AccountId, Amount, Balance, LedgerError};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::time::Duration;

/// Balance store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    /// Committed balances by account id
    balances: DashMap<AccountId, Balance>,

    /// Delay awaited before every call
    latency: Option<Duration>,
}

impl InMemoryBalanceStore {
    /// Create an empty store that answers immediately
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
            latency: None,
        }
    }

    /// Create an empty store that waits `latency` before every call
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            balances: DashMap::new(),
            latency: Some(latency),
        }
    }

    /// Number of accounts with a stored balance
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether no balance has been stored yet
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn find(&self, account: AccountId) -> Result<Option<Balance>, LedgerError> {
        simulate_latency(self.latency).await;

        Ok(self
            .balances
            .get(&account)
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, account: AccountId, balance: Amount) -> Result<Balance, LedgerError> {
        simulate_latency(self.latency).await;

        let mut entry = self
            .balances
            .entry(account)
            .or_insert_with(|| Balance::zero(account));
        entry.balance = balance;
        entry.last_updated = Utc::now();
        entry.revision += 1;

        Ok(entry.value().clone())
    }

    async fn all(&self) -> Result<Vec<Balance>, LedgerError> {
        simulate_latency(self.latency).await;

        Ok(self
            .balances
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}
