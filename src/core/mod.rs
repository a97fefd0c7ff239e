//! Core business logic module
//!
//! This module contains the conversion components:
//! - `traits` - Trait abstractions for interchangeable statement outputs
//! - `lookup` - Payments/transfers lookup tables and descriptor parsing
//! - `classifier` - Entry classification and enrichment
//! - `batch` - Batch accumulation and statement metadata
//! - `converter` - Pipeline orchestration

pub mod batch;
pub mod classifier;
pub mod converter;
pub mod lookup;
pub mod traits;

pub use batch::{BatchAccumulator, BatchConfig, BatchSummary, StatementHeader, MAX_BATCH_SIZE};
pub use classifier::{classify, AccountCategory, EntryClassifier};
pub use converter::{ConversionSummary, ConvertConfig, Converter};
pub use lookup::{descriptor_currency, descriptor_name, LookupTable, LookupTables};
pub use traits::StatementSink;
