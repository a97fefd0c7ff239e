//! Core traits
//!
//! The batch accumulator does not know which file format it produces. Every
//! flushed batch is handed to a [`StatementSink`], which lets the QBO writer, the
//! audit CSV writer and in-memory test sinks be used interchangeably.

use crate::types::{ConvertError, NormalizedRecord, StatementMetadata};

/// Destination for flushed statement batches
pub trait StatementSink {
    /// Write one statement
    ///
    /// `index` starts at 0 and increases by one per statement, with no gaps.
    /// `records` are in the order they were accepted.
    fn write_statement(
        &mut self,
        index: usize,
        statement: &StatementMetadata,
        records: &[NormalizedRecord],
    ) -> Result<(), ConvertError>;
}

impl<S: StatementSink + ?Sized> StatementSink for &mut S {
    fn write_statement(
        &mut self,
        index: usize,
        statement: &StatementMetadata,
        records: &[NormalizedRecord],
    ) -> Result<(), ConvertError> {
        (**self).write_statement(index, statement, records)
    }
}
