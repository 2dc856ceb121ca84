//! End-to-end integration tests
//!
//! Each test replays `input.csv` from a fixture directory through a
//! processing strategy and compares the report with `expected.csv`.
//!
//! Fixtures live in tests/fixtures/ and cover:
//! - Happy path charge/use flows
//! - Rejected uses (insufficient balance) and overflowing charges
//! - Invalid account ids and amounts
//! - Malformed rows, whitespace and case handling
//! - Many operations on the same account
//! - The history report
//!
//! Fixtures whose outcome depends on the order of operations on one account
//! run with the sequential strategy and with the batch strategy at one
//! operation per batch. Order-independent fixtures also run with full
//! batches, where operations on one account race for its lock.

#[cfg(test)]
mod tests {
    use point_ledger::cli::{ReportType, StrategyType};
    use point_ledger::strategy::{create_strategy, BatchConfig, ProcessingOptions};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    /// How a fixture is replayed
    #[derive(Debug, Clone, Copy)]
    enum Mode {
        /// Sequential strategy
        Sync,
        /// Batch strategy, one operation per batch
        AsyncOrdered,
        /// Batch strategy, every operation in a single batch
        AsyncConcurrent,
    }

    impl Mode {
        fn strategy(self) -> (StrategyType, Option<BatchConfig>) {
            match self {
                Mode::Sync => (StrategyType::Sync, None),
                Mode::AsyncOrdered => (StrategyType::Async, Some(BatchConfig::new(1, 4))),
                Mode::AsyncConcurrent => (StrategyType::Async, Some(BatchConfig::new(1000, 4))),
            }
        }
    }

    /// Run a fixture and compare its report with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if the fixture files cannot be read or the output differs.
    fn run_test_fixture(fixture_name: &str, mode: Mode, report: ReportType) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let (strategy_type, config) = mode.strategy();
        let options = ProcessingOptions {
            report,
            store_latency: None,
        };
        let strategy = create_strategy(strategy_type, config, options);

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(Path::new(&input_path), &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to process operations: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));

        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (mode: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, mode, actual_output, expected_output
        );
    }

    /// Fixtures whose result depends on per-account operation order
    #[rstest]
    #[case("happy_path")]
    #[case("insufficient_balance")]
    #[case("overflow")]
    fn test_ordered_fixtures(
        #[case] fixture: &str,
        #[values(Mode::Sync, Mode::AsyncOrdered)] mode: Mode,
    ) {
        run_test_fixture(fixture, mode, ReportType::Balances);
    }

    /// Fixtures with the same result under any interleaving
    #[rstest]
    #[case("invalid_input")]
    #[case("malformed_data")]
    #[case("multiple_accounts")]
    #[case("whitespace_and_case")]
    #[case("same_account_burst")]
    fn test_order_independent_fixtures(
        #[case] fixture: &str,
        #[values(Mode::Sync, Mode::AsyncOrdered, Mode::AsyncConcurrent)] mode: Mode,
    ) {
        run_test_fixture(fixture, mode, ReportType::Balances);
    }

    #[rstest]
    fn test_history_report(#[values(Mode::Sync, Mode::AsyncOrdered)] mode: Mode) {
        run_test_fixture("history_report", mode, ReportType::History);
    }
}
