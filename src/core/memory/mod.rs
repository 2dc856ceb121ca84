//! In-memory store implementations
//!
//! Volatile, single-process implementations of `BalanceStore` and
//! `HistoryStore` backed by `DashMap`. Both can be configured with a
//! simulated latency that is awaited before every call, which widens the
//! window in which concurrent operations on one account could interleave.

pub mod balance_store;
pub mod history_store;

pub use balance_store::InMemoryBalanceStore;
pub use history_store::InMemoryHistoryStore;

use std::time::Duration;

/// Sleep for the configured simulated latency, if any
async fn simulate_latency(latency: Option<Duration>) {
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}
