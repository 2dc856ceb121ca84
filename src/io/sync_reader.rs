//! Synchronous CSV reader for operation files
//!
//! `SyncReader` streams `OperationRecord`s out of a CSV file one row at a
//! time, delegating row conversion to the `csv_format` module.
//!
//! ```no_run
//! use point_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("Applying operation: {:?}", record),
//!         Err(e) => eprintln!("Skipped row: {}", e),
//!     }
//! }
//! ```
//!
//! Opening errors are returned from `new()`; per-row errors are yielded as
//! `Err` items so a bad row never stops the iteration. Parse errors carry
//! the 1-based file line (the header is line 1); for any error,
//! `line_number()` reports the line of the row just read.

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerError, OperationRecord};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Streaming reader over an operation CSV file
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Open `path` for streaming
    ///
    /// Fields are trimmed and rows may have a variable number of columns
    /// (a missing amount is reported per row, not as a fatal error).
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| LedgerError::file_open(path, e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1,
        })
    }

    /// File line of the row returned by the last call to `next`
    pub fn line_number(&self) -> usize {
        self.line_num
    }
}

impl Iterator for SyncReader {
    type Item = Result<OperationRecord, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();
        let row = deserializer.next()?;
        self.line_num += 1;

        let line = self.line_num as u64;
        Some(match row {
            Ok(csv_record) => convert_csv_record(csv_record).map_err(|e| e.with_line(line)),
            Err(e) => Err(LedgerError::from(e).with_line(line)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert_eq!(
            result.unwrap_err(),
            LedgerError::FileNotFound {
                path: "nonexistent.csv".to_string()
            }
        );
    }

    #[test]
    fn test_sync_reader_reads_operations_in_order() {
        let file = create_temp_csv("type,account,amount\ncharge,1,100\nuse,1,40\ncharge,2,7\n");

        let records: Vec<_> = SyncReader::new(file.path())
            .unwrap()
            .filter_map(Result::ok)
            .collect();

        assert_eq!(
            records,
            vec![
                OperationRecord {
                    op_type: OperationType::Charge,
                    account: 1,
                    amount: 100
                },
                OperationRecord {
                    op_type: OperationType::Use,
                    account: 1,
                    amount: 40
                },
                OperationRecord {
                    op_type: OperationType::Charge,
                    account: 2,
                    amount: 7
                },
            ]
        );
    }

    #[test]
    fn test_sync_reader_reports_line_numbers_and_continues() {
        let file = create_temp_csv(
            "type,account,amount\n\
             charge,1,100\n\
             charge,2,invalid\n\
             refund,3,5\n\
             use,1,50\n",
        );

        let mut reader = SyncReader::new(file.path()).unwrap();

        assert!(reader.next().unwrap().is_ok());
        assert_eq!(
            reader.next().unwrap(),
            Err(LedgerError::ParseError {
                line: Some(3),
                message: "Invalid amount 'invalid' for account 2".to_string()
            })
        );
        assert_eq!(
            reader.next().unwrap(),
            Err(LedgerError::InvalidOperationType {
                op_type: "refund".to_string()
            })
        );
        assert_eq!(reader.line_number(), 4);
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_sync_reader_reports_unparseable_account() {
        let file = create_temp_csv("type,account,amount\ncharge,abc,100\n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 1);
        assert!(matches!(
            records[0],
            Err(LedgerError::ParseError { line: Some(2), .. })
        ));
    }

    #[test]
    fn test_sync_reader_reports_missing_amount() {
        let file = create_temp_csv("type,account,amount\nuse,5,\n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records, vec![Err(LedgerError::missing_amount("use", 5))]);
    }

    #[test]
    fn test_sync_reader_handles_whitespace_and_case() {
        let file = create_temp_csv("type,account,amount\n  CHARGE  ,  1  ,  100  \n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        let record = records[0].as_ref().unwrap();
        assert_eq!(record.op_type, OperationType::Charge);
        assert_eq!(record.account, 1);
        assert_eq!(record.amount, 100);
    }

    #[test]
    fn test_sync_reader_empty_file_after_header() {
        let file = create_temp_csv("type,account,amount\n");

        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }
}
