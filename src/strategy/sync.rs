//! Sequential processing strategy
//!
//! `SyncProcessingStrategy` streams operations out of the CSV file with
//! `SyncReader` and applies them one at a time, in file order, on a
//! current-thread tokio runtime. No two operations are ever in flight
//! together, so the result is fully determined by the input.
//!
//! # Design
//!
//! The strategy only orchestrates:
//! - CSV parsing is done by `SyncReader` (iterator interface)
//! - Balance rules live in `LedgerService`
//! - Report output goes through `strategy::write_report`

use crate::io::sync_reader::SyncReader;
use crate::strategy::{write_report, ProcessingOptions, ProcessingStrategy};
use crate::types::{LedgerError, OperationRecord, OperationType};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use point_ledger::strategy::{ProcessingOptions, ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(ProcessingOptions::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    options: ProcessingOptions,
}

impl SyncProcessingStrategy {
    pub fn new(options: ProcessingOptions) -> Self {
        Self { options }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        // Open before building the runtime so a missing file fails fast
        let mut reader = SyncReader::new(input_path)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        runtime.block_on(async {
            let ledger = self.options.build_ledger();
            let mut applied = 0usize;
            let mut rejected = 0usize;

            // Not a `for` loop: the reader is still needed for line numbers
            while let Some(result) = reader.next() {
                let record: OperationRecord = match result {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(
                            line = reader.line_number(),
                            error = %e,
                            "skipping operation record"
                        );
                        continue;
                    }
                };

                let outcome = match record.op_type {
                    OperationType::Charge => ledger.charge(record.account, record.amount).await,
                    OperationType::Use => ledger.use_points(record.account, record.amount).await,
                };

                match outcome {
                    Ok(_) => applied += 1,
                    Err(e) => {
                        rejected += 1;
                        warn!(
                            account = record.account,
                            amount = record.amount,
                            error = %e,
                            "operation rejected"
                        );
                    }
                }
            }

            info!(applied, rejected, "sequential replay finished");
            write_report(&ledger, self.options.report, output).await
        })
    }
}
