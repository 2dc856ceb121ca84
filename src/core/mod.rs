//! Core ledger logic
//!
//! - `key_lock` - per-key mutual exclusion for account operations
//! - `validation` - input checks that run before any lock is taken
//! - `traits` - balance and history store abstractions
//! - `memory` - DashMap-backed store implementations
//! - `ledger` - the account ledger service
//! - `batch_processor` - concurrent submission of operation batches

pub mod batch_processor;
pub mod key_lock;
pub mod ledger;
pub mod memory;
pub mod traits;
pub mod validation;

pub use batch_processor::{BatchProcessor, OperationResult};
pub use key_lock::{KeyGuard, KeyedLock};
pub use ledger::LedgerService;
pub use memory::{InMemoryBalanceStore, InMemoryHistoryStore};
pub use traits::{BalanceStore, HistoryStore};
