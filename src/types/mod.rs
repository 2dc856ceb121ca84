//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account balance snapshot and identifiers
//! - `transaction`: History records and their kinds
//! - `operation`: Input operations replayed by the CLI
//! - `error`: Error types for the point ledger

pub mod account;
pub mod error;
pub mod operation;
pub mod transaction;

pub use account::{AccountId, Amount, Balance};
pub use error::LedgerError;
pub use operation::{OperationRecord, OperationType};
pub use transaction::{NewTransaction, TransactionId, TransactionKind, TransactionRecord};
