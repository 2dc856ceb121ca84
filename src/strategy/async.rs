//! Concurrent batch processing strategy
//!
//! This module provides the multi-threaded implementation of the
//! ProcessingStrategy trait. Operations are read in batches and every
//! operation of a batch is submitted to the ledger concurrently.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (one task per operation)
//!         └── LedgerService (per-account KeyedLock)
//!             ├── InMemoryBalanceStore
//!             └── InMemoryHistoryStore
//! ```
//!
//! # Ordering
//!
//! Batches are processed one after another. Inside a batch, operations on
//! the same account race for the account lock, so their relative order is
//! decided by lock arrival rather than by file order. Totals of charge-only
//! workloads and of workloads whose uses are always covered are the same as
//! with the sequential strategy.

use crate::core::BatchProcessor;
use crate::io::async_reader::AsyncReader;
use crate::strategy::{write_report, ProcessingOptions, ProcessingStrategy};
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Concurrent batch processing strategy
///
/// # Thread Safety
///
/// The ledger built for each run is shared by every operation task through
/// `BatchProcessor`; all mutation is serialized per account by the ledger's
/// lock map.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    options: ProcessingOptions,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent_batches
    /// * `options` - Report and store settings
    pub fn new(config: BatchConfig, options: ProcessingOptions) -> Self {
        Self { config, options }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay operations batch by batch on a multi-threaded runtime
    ///
    /// 1. Builds a fresh ledger and a BatchProcessor over it
    /// 2. Reads operations in batches with AsyncReader
    /// 3. Submits each batch concurrently and waits for it before reading the next
    /// 4. Writes the selected report
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .enable_time()
            .build()?;

        runtime.block_on(async {
            let processor = BatchProcessor::new(self.options.build_ledger());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| LedgerError::file_open(input_path, e))?;

            // csv-async reads futures::io::AsyncRead
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut applied = 0usize;
            let mut rejected = 0usize;

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for outcome in processor.process_batch(batch).await {
                    match outcome.result {
                        Ok(_) => applied += 1,
                        Err(e) => {
                            rejected += 1;
                            warn!(
                                account = outcome.record.account,
                                amount = outcome.record.amount,
                                error = %e,
                                "operation rejected"
                            );
                        }
                    }
                }
            }

            info!(applied, rejected, "batch replay finished");
            write_report(processor.ledger(), self.options.report, output).await
        })
    }
}
