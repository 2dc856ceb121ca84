//! Point Ledger Library
//! # Overview
//!
//! This library keeps a point balance per account and applies charge
//! (add points) and use (spend points) operations to it. Operations on one
//! account are serialized by a per-account lock; operations on different
//! accounts run in parallel. Every committed operation is appended to a
//! per-account history.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Balance, TransactionRecord, LedgerError, etc.)
//! - [`core`] - Ledger components:
//!   - [`core::key_lock`] - Per-key mutual exclusion
//!   - [`core::ledger`] - Charge, use and query operations
//!   - [`core::validation`] - Input checks run before locking
//!   - [`core::traits`] / [`core::memory`] - Store abstractions and in-memory implementations
//!   - [`core::batch_processor`] - Concurrent submission of operation batches
//! - [`io`] - Operation CSV readers and report writers
//! - [`strategy`] - Sequential and concurrent replay pipelines
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - tracing subscriber set-up
//!
//! # Invariants
//!
//! - A balance is never negative after a committed operation
//! - Concurrent operations on one account never lose an update
//! - An account's history lists its transactions in commit order

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{
    BalanceStore, BatchProcessor, HistoryStore, InMemoryBalanceStore, InMemoryHistoryStore,
    KeyGuard, KeyedLock, LedgerService,
};
pub use io::{write_balances_csv, write_history_csv};
pub use types::{
    AccountId, Amount, Balance, LedgerError, OperationRecord, OperationType, TransactionId,
    TransactionKind, TransactionRecord,
};
