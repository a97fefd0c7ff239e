//! Batch accumulation and statement emission
//!
//! Accepted records are collected into a batch. When the batch reaches the
//! configured size it is flushed: statement metadata is computed from its records,
//! the batch is handed to a [`StatementSink`], and a new empty batch begins.
//! [`BatchAccumulator::finish`] flushes whatever remains at end of stream.
//!
//! An empty remainder is not written. A stream with no exportable entries
//! therefore produces no statement at all.

use crate::core::traits::StatementSink;
use crate::types::{ConvertError, NormalizedRecord, StatementMetadata};
use chrono::NaiveDate;
use log::{info, warn};
use rust_decimal::Decimal;

/// Maximum number of transactions per statement file
pub const MAX_BATCH_SIZE: usize = 500;

/// Configuration for batching
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of records per statement
    pub max_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; a zero size falls back to the default
    pub fn new(max_batch_size: usize) -> Self {
        let default = Self::default();

        let max_batch_size = if max_batch_size == 0 {
            warn!(
                "Invalid batch size ({}), using default ({})",
                max_batch_size, default.max_batch_size
            );
            default.max_batch_size
        } else {
            max_batch_size
        };

        Self { max_batch_size }
    }
}

/// Statement fields that do not depend on the batch contents
#[derive(Clone, Debug, PartialEq)]
pub struct StatementHeader {
    pub server_time: NaiveDate,
    pub org: String,
    pub fid: String,
    pub bank_id: String,
    pub account_id: String,
    pub account_type: String,
}

impl StatementHeader {
    /// Header with the fixed Stripe institution identifiers
    pub fn new(account_id: impl Into<String>, server_time: NaiveDate) -> Self {
        StatementHeader {
            server_time,
            org: "Stripe".to_string(),
            fid: "0".to_string(),
            bank_id: "123456789".to_string(),
            account_id: account_id.into(),
            account_type: "CHECKING".to_string(),
        }
    }
}

impl StatementMetadata {
    /// Compute the metadata for one batch
    ///
    /// The date range spans the dated records only; the opening balance is zero
    /// and the balance is reported as of the last date.
    pub fn for_batch(header: &StatementHeader, records: &[NormalizedRecord]) -> Self {
        let dates = records.iter().filter_map(|r| r.date);
        let start = dates.clone().min();
        let end = dates.max();

        StatementMetadata {
            server_time: header.server_time,
            org: header.org.clone(),
            fid: header.fid.clone(),
            bank_id: header.bank_id.clone(),
            account_id: header.account_id.clone(),
            account_type: header.account_type.clone(),
            start,
            end,
            balance: Decimal::ZERO,
            as_of: end,
        }
    }
}

/// Totals reported once the stream is finished
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub statements_written: usize,
    pub records_written: usize,
}

/// Collects records into size-bounded batches and flushes them to a sink
pub struct BatchAccumulator<S: StatementSink> {
    header: StatementHeader,
    config: BatchConfig,
    sink: S,
    batch: Vec<NormalizedRecord>,
    summary: BatchSummary,
}

impl<S: StatementSink> BatchAccumulator<S> {
    pub fn new(header: StatementHeader, config: BatchConfig, sink: S) -> Self {
        let batch = Vec::with_capacity(config.max_batch_size);
        BatchAccumulator {
            header,
            config,
            sink,
            batch,
            summary: BatchSummary::default(),
        }
    }

    /// Append a classified record, flushing when the batch is full
    ///
    /// `None` (a suppressed entry) is ignored.
    pub fn accept(&mut self, record: Option<NormalizedRecord>) -> Result<(), ConvertError> {
        let Some(record) = record else {
            return Ok(());
        };

        self.batch.push(record);
        if self.batch.len() >= self.config.max_batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Number of records waiting in the current batch
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Flush the remainder and return the totals
    pub fn finish(mut self) -> Result<BatchSummary, ConvertError> {
        if !self.batch.is_empty() {
            self.flush()?;
        }
        if self.summary.statements_written == 0 {
            warn!("No transactions to export; no statement written");
        }
        Ok(self.summary)
    }

    fn flush(&mut self) -> Result<(), ConvertError> {
        let index = self.summary.statements_written;
        let statement = StatementMetadata::for_batch(&self.header, &self.batch);

        self.sink
            .write_statement(index, &statement, &self.batch)?;
        info!("Wrote statement {} with {} transactions", index, self.batch.len());

        self.summary.statements_written += 1;
        self.summary.records_written += self.batch.len();
        self.batch.clear();
        Ok(())
    }
}
