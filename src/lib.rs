//! Stripe IIF to QBO converter library
//! # Overview
//!
//! This library converts the QuickBooks IIF ledger that Stripe exports into QBO
//! bank-statement files that accounting software can import as a checking account.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (LedgerEntry, NormalizedRecord, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::lookup`] - Lookup tables built from Stripe payments/transfers exports
//!   - [`core::classifier`] - Per-entry classification and enrichment
//!   - [`core::batch`] - Batching into statements of at most 500 transactions
//!   - [`core::converter`] - Pipeline orchestration
//! - [`io`] - IIF reading, QBO writing and CSV audit output
//!
//! # Account Categories
//!
//! - **Stripe Sales**: card charges, named after the card holder when known
//! - **Stripe Payment Processing Fees**: `FEE` lines per charge
//! - **Stripe Returns**: refunds
//! - **Stripe Checking Account**: payouts (`XFER`)
//! - **Stripe Third-party Account**: transfers from Stripe
//! - **Stripe Other Income**: adjustments
//! - **Stripe Account**: the balance account itself, never exported
//!
//! Any other account label passes through with its label as the payee name.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use crate::core::{classify, ConvertConfig, Converter, LookupTable, LookupTables};
pub use crate::io::{write_qbo, write_records_csv, IifReader};
pub use crate::types::{ConvertError, LedgerEntry, NormalizedRecord, StatementMetadata, TransactionGroup};
