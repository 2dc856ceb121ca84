//! Error types for the point ledger
//!
//! This module defines all error types that can occur while applying ledger
//! operations or replaying operation files.
//!
//! # Error Categories
//!
//! - **Input Errors**: Invalid account ids, non-positive amounts
//! - **State Errors**: Insufficient balance for a use
//! - **Arithmetic Errors**: Overflow in balance calculations
//! - **Storage Errors**: Failures reported by a balance or history store
//! - **File I/O and CSV Errors**: File not found, malformed rows, etc.
//!
//! None of these errors is fatal to the process: a failure on one account
//! never affects the lock or state of another account.

use crate::types::{AccountId, Amount};
use std::path::Path;
use thiserror::Error;

/// Main error type for the point ledger
///
/// Each variant includes the context needed to report the failure back to
/// the caller. The core never retries; retries are the caller's concern.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Account id is zero or negative
    ///
    /// Raised before any lock is taken.
    #[error("Invalid account id {account}")]
    InvalidAccount {
        /// The rejected account id
        account: AccountId,
    },

    /// Operation amount is zero or negative
    ///
    /// Raised before any lock is taken.
    #[error("Invalid amount {amount}: amount must be greater than zero")]
    InvalidAmount {
        /// The rejected amount
        amount: Amount,
    },

    /// Use amount exceeds the balance at the time the lock was granted
    ///
    /// The balance is left unchanged.
    #[error("Insufficient balance for account {account}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Account id
        account: AccountId,
        /// Balance when the lock was granted
        available: Amount,
        /// Requested use amount
        requested: Amount,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected to keep the balance representable.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account id
        account: AccountId,
    },

    /// A history record carried a timestamp at or before the Unix epoch
    #[error("Invalid timestamp for account {account} history record")]
    InvalidTimestamp {
        /// Account id
        account: AccountId,
    },

    /// A store could not complete a read or write
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the store failure
        message: String,
    },

    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// The malformed row is skipped and processing continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Unknown operation type in an input row
    #[error("Invalid operation type '{op_type}'")]
    InvalidOperationType {
        /// The invalid operation type string
        op_type: String,
    },

    /// Amount column is missing or blank
    #[error("{op_type} operation for account {account} requires an amount")]
    MissingAmount {
        /// Operation type that requires an amount
        op_type: String,
        /// Account id
        account: AccountId,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidAccount error
    pub fn invalid_account(account: AccountId) -> Self {
        LedgerError::InvalidAccount { account }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Amount) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(account: AccountId, available: Amount, requested: Amount) -> Self {
        LedgerError::InsufficientBalance {
            account,
            available,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create an InvalidTimestamp error
    pub fn invalid_timestamp(account: AccountId) -> Self {
        LedgerError::InvalidTimestamp { account }
    }

    /// Create a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        LedgerError::Storage {
            message: message.into(),
        }
    }

    /// Create a MissingAmount error
    pub fn missing_amount(op_type: &str, account: AccountId) -> Self {
        LedgerError::MissingAmount {
            op_type: op_type.to_string(),
            account,
        }
    }

    /// Create the error for a file that could not be opened
    ///
    /// A missing file becomes `FileNotFound`; any other failure an `IoError`.
    pub fn file_open(path: &Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            LedgerError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            LedgerError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), error),
            }
        }
    }

    /// Set the input line of a `ParseError`; other variants are returned as is
    pub fn with_line(self, line: u64) -> Self {
        match self {
            LedgerError::ParseError { message, .. } => LedgerError::ParseError {
                line: Some(line),
                message,
            },
            other => other,
        }
    }
}
