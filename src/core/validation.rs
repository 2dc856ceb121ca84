//! Input validation performed before any account lock is requested
//!
//! Invalid requests are rejected here so they never contend for an
//! account's lock.

use crate::types::{AccountId, Amount, LedgerError};
use chrono::{DateTime, Utc};

/// Account ids must be strictly positive
pub fn validate_account(account: AccountId) -> Result<(), LedgerError> {
    if account <= 0 {
        return Err(LedgerError::invalid_account(account));
    }
    Ok(())
}

/// Charge and use amounts must be strictly positive
pub fn validate_amount(amount: Amount) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::invalid_amount(amount));
    }
    Ok(())
}

/// History timestamps must lie after the Unix epoch
///
/// The zero balance carries the epoch as `last_updated`; a record stamped
/// with it would not belong to any committed transition.
pub fn validate_timestamp(account: AccountId, timestamp: DateTime<Utc>) -> Result<(), LedgerError> {
    if timestamp.timestamp_millis() <= 0 {
        return Err(LedgerError::invalid_timestamp(account));
    }
    Ok(())
}
