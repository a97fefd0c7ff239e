//! Ledger-side types produced by the IIF reader
//!
//! An IIF export groups ledger lines into transactions: one `TRNS` line followed
//! by any number of `SPL` (split) lines. Each line becomes a [`LedgerEntry`].

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One line of the double-entry ledger export
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// IIF `TRNSTYPE` column (e.g. "GENERAL JOURNAL", "DEPOSIT")
    pub trns_type: String,

    /// Posting date; `None` when the DATE cell is empty
    pub date: Option<NaiveDate>,

    /// Account label the line is booked against
    pub account: String,

    /// Counterparty name
    pub name: String,

    /// Free-text memo, usually carrying a Stripe object id
    pub memo: String,

    /// Signed amount from the ledger's own perspective
    pub amount: Decimal,
}

impl LedgerEntry {
    /// Create an entry with an account, memo and amount; the remaining fields are empty
    pub fn new(account: impl Into<String>, memo: impl Into<String>, amount: Decimal) -> Self {
        LedgerEntry {
            trns_type: String::new(),
            date: None,
            account: account.into(),
            name: String::new(),
            memo: memo.into(),
            amount,
        }
    }
}

/// A balanced ledger transaction: the `TRNS` line and its splits, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionGroup {
    pub entries: Vec<LedgerEntry>,
}
