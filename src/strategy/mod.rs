//! Processing strategy module for ledger replay pipelines
//!
//! A strategy reads operations from a CSV file, applies them to a fresh
//! in-memory ledger and writes a report of the resulting state. Two
//! implementations can be selected at runtime: a sequential one and a
//! concurrent batch one.

use crate::cli::{ReportType, StrategyType};
use crate::core::{InMemoryBalanceStore, InMemoryHistoryStore, LedgerService};
use crate::io::{write_balances_csv, write_history_csv};
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Ledger over the in-memory stores, as built by every strategy
pub type MemoryLedger = LedgerService<InMemoryBalanceStore, InMemoryHistoryStore>;

/// Processing strategy trait for complete replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay the operations in `input_path` and write the report to `output`
    ///
    /// # Returns
    ///
    /// * `Ok(())` if processing completed, including when individual
    ///   operations were rejected
    /// * `Err(LedgerError)` if a fatal error occurred: `FileNotFound`, or
    ///   `IoError` when the runtime can't start or the output isn't writable
    ///
    /// Rejected operations and malformed rows are logged as warnings and do
    /// not stop processing.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError>;
}

/// Settings shared by both strategies
#[derive(Clone, Debug, Default)]
pub struct ProcessingOptions {
    /// Which report to write once every operation is applied
    pub report: ReportType,

    /// Simulated latency of each store call
    pub store_latency: Option<Duration>,
}

impl ProcessingOptions {
    /// Build an empty ledger honoring the configured store latency
    pub fn build_ledger(&self) -> MemoryLedger {
        let (balances, history) = match self.store_latency {
            Some(latency) => (
                InMemoryBalanceStore::with_latency(latency),
                InMemoryHistoryStore::with_latency(latency),
            ),
            None => (InMemoryBalanceStore::new(), InMemoryHistoryStore::new()),
        };

        LedgerService::new(Arc::new(balances), Arc::new(history))
    }
}

/// Write the selected report of `ledger` to `output`
pub async fn write_report(
    ledger: &MemoryLedger,
    report: ReportType,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let balances = ledger.balances().await?;

    match report {
        ReportType::Balances => write_balances_csv(&balances, output),
        ReportType::History => {
            // Every account with history has a stored balance
            let mut records = Vec::new();
            for balance in &balances {
                records.extend(ledger.get_history(balance.account).await?);
            }
            write_history_csv(&records, output)
        }
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional batch configuration (ignored for sync)
/// * `options` - Report and store settings used by either strategy
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    options: ProcessingOptions,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(options)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, options))
        }
    }
}
