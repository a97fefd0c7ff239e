//! Bank-statement-side types
//!
//! A [`NormalizedRecord`] is one statement transaction derived from exactly one
//! ledger entry. Records are collected into batches and each batch becomes one
//! statement file described by a [`StatementMetadata`].

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Currency carried by a record when no lookup supplied one
pub const DEFAULT_CURRENCY: &str = "usd";

/// One bank-statement transaction
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// Posting date (copied from the ledger entry)
    pub date: Option<NaiveDate>,

    /// Financial institution transaction id
    ///
    /// Defaults to the entry memo; replaced by the correlation id when a
    /// lookup succeeds for fee, sale and refund entries.
    pub fitid: String,

    /// Account label of the originating ledger entry
    pub account: String,

    /// Statement transaction type tag (e.g. "XFER", "FEE")
    pub trn_type: String,

    /// Memo, possibly spliced with a lookup descriptor
    pub memo: String,

    /// Currency code as found in the lookup descriptor (never converted)
    pub currency: String,

    /// Signed amount from the bank's perspective
    pub amount: Decimal,

    /// Display name (payee)
    pub name: String,
}

/// Statement-level header for one output file
///
/// Computed fresh for every batch; nothing carries over between batches.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementMetadata {
    /// Server / as-of timestamp supplied by configuration
    pub server_time: NaiveDate,

    /// Financial institution name
    pub org: String,

    /// Financial institution id
    pub fid: String,

    /// Bank routing id
    pub bank_id: String,

    /// Account id from configuration
    pub account_id: String,

    /// Account type
    pub account_type: String,

    /// Earliest record date in the batch
    pub start: Option<NaiveDate>,

    /// Latest record date in the batch
    pub end: Option<NaiveDate>,

    /// Ledger balance reported for the statement (always zero)
    pub balance: Decimal,

    /// Balance as-of date (the latest record date)
    pub as_of: Option<NaiveDate>,
}
