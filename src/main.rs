//! Point ledger CLI
//!
//! Replays charge/use operations from a CSV file against an in-memory
//! per-account ledger and prints a report to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --strategy sync operations.csv > balances.csv
//! cargo run -- --report history operations.csv > history.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv
//! RUST_LOG=point_ledger=debug cargo run -- --log-json operations.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success (rejected operations are logged, not fatal)
//! - 1: Error (file not found, file not readable, output failure)

use point_ledger::{cli, logging, strategy};
use std::process;

fn main() {
    let args = cli::parse_args();

    if let Err(e) = logging::init(args.log_json) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), config, args.to_processing_options())
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
