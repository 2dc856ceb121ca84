//! CSV format handling for operation records and ledger reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain types
//! - Balance and history report serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{
    AccountId, Balance, LedgerError, OperationRecord, OperationType, TransactionRecord,
};
use serde::Deserialize;
use std::io::Write;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, account, amount.
/// The amount is read as a string so that a blank or malformed value can be
/// reported with the row's context instead of failing deserialization.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    pub account: AccountId,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to an OperationRecord
///
/// This function:
/// - Parses the operation type string (case-insensitive)
/// - Parses the amount string into an integer
///
/// Account ids and amounts are not range-checked here; zero and negative
/// values are passed through so the ledger reports them as
/// `InvalidAccount` / `InvalidAmount`.
///
/// # Returns
///
/// Result containing either:
/// - Ok(OperationRecord) - Successfully converted record
/// - Err(LedgerError) - `InvalidOperationType`, `MissingAmount`, or a
///   `ParseError` without a line number for an amount that isn't an integer
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<OperationRecord, LedgerError> {
    let op_type = match csv_record.op_type.to_lowercase().as_str() {
        "charge" => OperationType::Charge,
        "use" => OperationType::Use,
        _ => {
            return Err(LedgerError::InvalidOperationType {
                op_type: csv_record.op_type,
            })
        }
    };

    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            amount_str.trim().parse::<i64>().map_err(|_| LedgerError::ParseError {
                line: None,
                message: format!(
                    "Invalid amount '{}' for account {}",
                    amount_str, csv_record.account
                ),
            })?
        }
        _ => {
            return Err(LedgerError::missing_amount(
                &csv_record.op_type.to_lowercase(),
                csv_record.account,
            ))
        }
    };

    Ok(OperationRecord {
        op_type,
        account: csv_record.account,
        amount,
    })
}

/// Wrap a csv writer failure as an output error
fn write_error(what: &str, error: impl std::fmt::Display) -> LedgerError {
    LedgerError::IoError {
        message: format!("Failed to write {}: {}", what, error),
    }
}

/// Write balances in CSV format
///
/// Writes balances with columns: account, balance, revision.
/// Rows are sorted by account id for deterministic output.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(LedgerError::IoError)` if a write error occurred
pub fn write_balances_csv(
    balances: &[Balance],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "balance", "revision"])
        .map_err(|e| write_error("CSV header", e))?;

    let mut sorted = balances.to_vec();
    sorted.sort_by_key(|balance| balance.account);

    for balance in sorted {
        writer
            .write_record(&[
                balance.account.to_string(),
                balance.balance.to_string(),
                balance.revision.to_string(),
            ])
            .map_err(|e| write_error("balance record", e))?;
    }

    writer
        .flush()
        .map_err(|e| write_error("output", e))?;

    Ok(())
}

/// Write transaction history in CSV format
///
/// Writes records with columns: id, account, kind, amount, revision.
/// Accounts are sorted by id; within an account the given order (commit
/// order) is preserved. Ids are left out of the sort because they reflect
/// append order, which can differ from commit order.
pub fn write_history_csv(
    records: &[TransactionRecord],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["id", "account", "kind", "amount", "revision"])
        .map_err(|e| write_error("CSV header", e))?;

    // Stable sort keeps each account's records in commit order
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|record| record.account);

    for record in sorted {
        writer
            .write_record(&[
                record.id.to_string(),
                record.account.to_string(),
                record.kind.to_string(),
                record.amount.to_string(),
                record.revision.to_string(),
            ])
            .map_err(|e| write_error("history record", e))?;
    }

    writer
        .flush()
        .map_err(|e| write_error("output", e))?;

    Ok(())
}
