//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `entry`: Ledger entries and transaction groups read from IIF
//! - `record`: Normalized statement records and statement metadata
//! - `error`: Error types for the converter

pub mod entry;
pub mod error;
pub mod record;

pub use entry::{LedgerEntry, TransactionGroup};
pub use error::ConvertError;
pub use record::{NormalizedRecord, StatementMetadata, DEFAULT_CURRENCY};
