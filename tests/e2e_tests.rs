//! End-to-end integration tests
//!
//! These tests validate the complete conversion pipeline. Fixture tests:
//! 1. Read input.iif (plus payments.csv / transfers.csv when present) from a fixture directory
//! 2. Convert into a temporary output directory with audit CSV enabled
//! 3. Compare the audit CSV of the first statement with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Enrichment from both lookup tables
//! - The same ledger without any lookup tables
//! - Pass-through, suppressed and dropped accounts
//!
//! The remaining tests build ledgers on the fly to check batching and file naming.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::fmt::Write as _;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use stripe_iif_to_qbo::core::{BatchConfig, ConvertConfig, Converter};
    use stripe_iif_to_qbo::ConvertError;
    use tempfile::{tempdir, NamedTempFile, TempDir};

    const HEADER: &str = "!TRNS\tTRNSID\tTRNSTYPE\tDATE\tACCNT\tNAME\tCLASS\tAMOUNT\tDOCNUM\tMEMO\n\
                          !SPL\tSPLID\tTRNSTYPE\tDATE\tACCNT\tNAME\tCLASS\tAMOUNT\tDOCNUM\tMEMO\n\
                          !ENDTRNS\n";

    fn config(iif: &Path, out: &TempDir) -> ConvertConfig {
        ConvertConfig {
            account_id: "000123".to_string(),
            iif_file: iif.to_path_buf(),
            payments_file: None,
            transfers_file: None,
            server_time: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            output_base: out.path().join("stripe"),
            batch: BatchConfig::default(),
            audit_csv: true,
        }
    }

    fn optional(path: PathBuf) -> Option<PathBuf> {
        path.exists().then_some(path)
    }

    /// Run a fixture and compare its audit CSV with expected.csv
    fn run_test_fixture(fixture_name: &str) {
        let fixture_dir = Path::new("tests/fixtures").join(fixture_name);
        let input_path = fixture_dir.join("input.iif");
        let expected_path = fixture_dir.join("expected.csv");

        assert!(input_path.exists(), "Input file not found: {}", input_path.display());

        let out = tempdir().expect("Failed to create temp dir");
        let mut cfg = config(&input_path, &out);
        cfg.payments_file = optional(fixture_dir.join("payments.csv"));
        cfg.transfers_file = optional(fixture_dir.join("transfers.csv"));

        let summary = Converter::new(cfg)
            .run()
            .unwrap_or_else(|e| panic!("Failed to convert {}: {}", fixture_name, e));
        assert_eq!(summary.statements_written, 1);

        let actual_output = fs::read_to_string(out.path().join("stripe_0.csv"))
            .unwrap_or_else(|e| panic!("Failed to read audit output: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file: {}", e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {}\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, actual_output, expected_output
        );
        assert!(out.path().join("stripe_0.qbo").exists());
        assert!(!out.path().join("stripe_1.qbo").exists());
    }

    #[rstest]
    #[case("enriched")]
    #[case("no_lookups")]
    #[case("mixed_accounts")]
    fn test_fixtures(#[case] fixture: &str) {
        run_test_fixture(fixture);
    }

    /// Ledger with one transaction group holding `count` sales entries
    fn sales_ledger(count: usize) -> NamedTempFile {
        let mut content = String::from(HEADER);
        for n in 0..count {
            let kind = if n == 0 { "TRNS" } else { "SPL" };
            writeln!(
                content,
                "{}\t\tGENERAL JOURNAL\t03/{:02}/2024\tStripe Sales\t\t\t-1.00\t\tCharge ID: ch_{}",
                kind,
                n % 28 + 1,
                n
            )
            .unwrap();
        }
        content.push_str("ENDTRNS\n");

        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn transaction_count(path: &Path) -> usize {
        fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
            .matches("<STMTTRN>")
            .count()
    }

    #[test]
    fn test_501_entries_produce_two_statements() {
        let ledger = sales_ledger(501);
        let out = tempdir().expect("Failed to create temp dir");

        let summary = Converter::new(config(ledger.path(), &out)).run().unwrap();

        assert_eq!(summary.entries_read, 501);
        assert_eq!(summary.statements_written, 2);
        assert_eq!(transaction_count(&out.path().join("stripe_0.qbo")), 500);
        assert_eq!(transaction_count(&out.path().join("stripe_1.qbo")), 1);
        assert!(!out.path().join("stripe_2.qbo").exists());
    }

    #[rstest]
    #[case::exact_multiple(20, 10, vec![10, 10])]
    #[case::remainder(23, 10, vec![10, 10, 3])]
    #[case::single(1, 10, vec![1])]
    fn test_batches_are_numbered_without_gaps(
        #[case] entries: usize,
        #[case] batch_size: usize,
        #[case] expected: Vec<usize>,
    ) {
        let ledger = sales_ledger(entries);
        let out = tempdir().expect("Failed to create temp dir");
        let mut cfg = config(ledger.path(), &out);
        cfg.batch = BatchConfig::new(batch_size);

        Converter::new(cfg).run().unwrap();

        let counts: Vec<usize> = (0..expected.len())
            .map(|i| transaction_count(&out.path().join(format!("stripe_{}.qbo", i))))
            .collect();
        assert_eq!(counts, expected);
        assert!(!out
            .path()
            .join(format!("stripe_{}.qbo", expected.len()))
            .exists());
    }

    #[test]
    fn test_statement_header_comes_from_batch() {
        let ledger = sales_ledger(3);
        let out = tempdir().expect("Failed to create temp dir");

        Converter::new(config(ledger.path(), &out)).run().unwrap();

        let qbo = fs::read_to_string(out.path().join("stripe_0.qbo")).unwrap();
        assert!(qbo.contains("<DTSERVER>20240430000000"));
        assert!(qbo.contains("<ACCTID>000123"));
        assert!(qbo.contains("<DTSTART>20240301\n<DTEND>20240303\n"));
        assert!(qbo.contains("<DTASOF>20240303"));
        assert!(qbo.contains("<TRNAMT>1.00\n<FITID>Charge ID: ch_0\n<NAME>Credit Card Charge\n"));
    }

    #[test]
    fn test_ledger_without_exportable_entries_writes_no_file() {
        let mut content = String::from(HEADER);
        content.push_str("TRNS\t\tX\t03/01/2024\tStripe Account\t\t\t1.00\t\tm\n");
        content.push_str("SPL\t\tX\t03/01/2024\tStripe Sales\t\t\t0.00\t\tm\nENDTRNS\n");
        let mut ledger = NamedTempFile::new().expect("Failed to create temp file");
        ledger.write_all(content.as_bytes()).unwrap();
        ledger.flush().unwrap();
        let out = tempdir().expect("Failed to create temp dir");

        let summary = Converter::new(config(ledger.path(), &out)).run().unwrap();

        assert_eq!(summary.entries_suppressed, 2);
        assert_eq!(summary.statements_written, 0);
        assert!(!out.path().join("stripe_0.qbo").exists());
    }

    #[test]
    fn test_missing_ledger_is_fatal() {
        let out = tempdir().expect("Failed to create temp dir");
        let result = Converter::new(config(Path::new("tests/fixtures/nope.iif"), &out)).run();

        assert!(matches!(result, Err(ConvertError::FileNotFound { .. })));
        assert!(fs::read_dir(out.path()).unwrap().next().is_none());
    }
}
