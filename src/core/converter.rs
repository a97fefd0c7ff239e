//! Conversion pipeline
//!
//! Wires the components together in a single synchronous pass:
//!
//! ```text
//! IifReader -> TransactionGroup -> LedgerEntry -> classify() -> BatchAccumulator -> StatementSink
//!                                                      ^
//!                                   LookupTables (payments, transfers)
//! ```
//!
//! Configuration is validated before any file is read. Every error raised while
//! streaming is fatal; data-quality anomalies are absorbed by the classifier.

use crate::core::batch::{BatchAccumulator, BatchConfig, StatementHeader};
use crate::core::classifier::EntryClassifier;
use crate::core::lookup::LookupTables;
use crate::core::traits::StatementSink;
use crate::io::{IifReader, QboFileSink};
use crate::types::ConvertError;
use chrono::NaiveDate;
use log::{debug, info};
use std::path::PathBuf;

/// Everything a conversion run needs
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// ACCTID written into every statement
    pub account_id: String,
    /// IIF ledger export
    pub iif_file: PathBuf,
    /// Optional payments report
    pub payments_file: Option<PathBuf>,
    /// Optional transfers report
    pub transfers_file: Option<PathBuf>,
    /// Server / as-of date written into every statement
    pub server_time: NaiveDate,
    /// Output base path; statements are `<base>_<n>.qbo`
    pub output_base: PathBuf,
    pub batch: BatchConfig,
    /// Also write `<base>_<n>.csv`
    pub audit_csv: bool,
}

impl ConvertConfig {
    /// Check required values and input paths
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.account_id.trim().is_empty() {
            return Err(ConvertError::missing_config("account id"));
        }
        if self.iif_file.as_os_str().is_empty() {
            return Err(ConvertError::missing_config("iif file"));
        }
        if self.output_base.as_os_str().is_empty() {
            return Err(ConvertError::missing_config("output file"));
        }

        let inputs = std::iter::once(&self.iif_file)
            .chain(self.payments_file.as_ref())
            .chain(self.transfers_file.as_ref());
        for path in inputs {
            if !path.exists() {
                return Err(ConvertError::file_not_found(path));
            }
        }
        Ok(())
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub groups_read: usize,
    pub entries_read: usize,
    pub entries_suppressed: usize,
    pub statements_written: usize,
    pub records_written: usize,
}

/// Drives a conversion from IIF to statements
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Converter { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert to numbered QBO files next to the configured output base
    pub fn run(&self) -> Result<ConversionSummary, ConvertError> {
        let sink = QboFileSink::new(&self.config.output_base)
            .with_audit_csv(self.config.audit_csv);
        self.run_with_sink(sink)
    }

    /// Convert, handing every statement to `sink`
    pub fn run_with_sink<S: StatementSink>(
        &self,
        sink: S,
    ) -> Result<ConversionSummary, ConvertError> {
        self.config.validate()?;

        let tables = LookupTables::load(
            self.config.payments_file.as_deref(),
            self.config.transfers_file.as_deref(),
        )?;
        info!(
            "Loaded {} payment and {} transfer descriptors",
            tables.payments.len(),
            tables.transfers.len()
        );

        let classifier = EntryClassifier::new(&tables.payments, &tables.transfers);
        let header = StatementHeader::new(&self.config.account_id, self.config.server_time);
        let mut accumulator = BatchAccumulator::new(header, self.config.batch.clone(), sink);
        let mut summary = ConversionSummary::default();

        for group in IifReader::new(&self.config.iif_file)? {
            let group = group?;
            summary.groups_read += 1;

            for entry in &group.entries {
                summary.entries_read += 1;
                let record = classifier.classify(entry);
                if record.is_none() {
                    debug!("Skipped '{}' entry: {}", entry.account, entry.memo);
                    summary.entries_suppressed += 1;
                }
                accumulator.accept(record)?;
            }
        }

        let batches = accumulator.finish()?;
        summary.statements_written = batches.statements_written;
        summary.records_written = batches.records_written;

        info!(
            "Converted {} entries from {} transactions into {} statements ({} suppressed)",
            summary.entries_read,
            summary.groups_read,
            summary.statements_written,
            summary.entries_suppressed
        );
        Ok(summary)
    }
}
