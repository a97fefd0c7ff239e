//! Entry classification and enrichment
//!
//! Turns one [`LedgerEntry`] into at most one [`NormalizedRecord`]. The account
//! label selects a category; categories that know where Stripe hides an object id
//! in the memo extract it with a regex and look it up in the matching lookup table.
//!
//! Classification is a pure function of the entry and the two read-only tables:
//! classifying the same entry twice always yields the same result.
//!
//! # Rules common to every category
//!
//! - The amount is negated: the ledger books debits and credits from its own
//!   side, a bank statement from the account holder's side.
//! - A record whose final amount is exactly zero is suppressed.
//! - A memo without an id, or an id missing from its table, keeps the category
//!   defaults. Neither is an error.

use crate::core::lookup::{descriptor_currency, descriptor_name, LookupTable};
use crate::types::{LedgerEntry, NormalizedRecord, DEFAULT_CURRENCY};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static TRANSFER_FROM_STRIPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Transfer from Stripe: (\S+)").expect("valid regex"));
static TRANSFER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Transfer ID: (\S+)").expect("valid regex"));
static FEES_FOR_CHARGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Fees for charge ID: (\S+)").expect("valid regex"));
static CHARGE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Charge ID: (\S+)").expect("valid regex"));
static REFUND_OF_CHARGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Refund of charge (\S+)").expect("valid regex"));

/// Semantic category of a ledger account label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountCategory {
    /// "Stripe Third-party Account": transfers arriving from Stripe
    ThirdParty,
    /// "Stripe Checking Account": payouts to the bank account
    Checking,
    /// "Stripe Payment Processing Fees"
    ProcessingFees,
    /// "Stripe Sales": card charges
    Sales,
    /// "Stripe Returns": refunds
    Returns,
    /// "Stripe Other Income"
    OtherIncome,
    /// "Stripe Account": the balance account itself, never exported
    StripeAccount,
    /// Any label outside the known set
    Other,
}

impl AccountCategory {
    /// Map an account label to its category (exact, case-sensitive)
    pub fn from_label(label: &str) -> Self {
        match label {
            "Stripe Third-party Account" => AccountCategory::ThirdParty,
            "Stripe Checking Account" => AccountCategory::Checking,
            "Stripe Payment Processing Fees" => AccountCategory::ProcessingFees,
            "Stripe Sales" => AccountCategory::Sales,
            "Stripe Returns" => AccountCategory::Returns,
            "Stripe Other Income" => AccountCategory::OtherIncome,
            "Stripe Account" => AccountCategory::StripeAccount,
            _ => AccountCategory::Other,
        }
    }
}

/// Classifier bound to a pair of lookup tables
#[derive(Debug, Clone, Copy)]
pub struct EntryClassifier<'a> {
    payments: &'a LookupTable,
    transfers: &'a LookupTable,
}

impl<'a> EntryClassifier<'a> {
    pub fn new(payments: &'a LookupTable, transfers: &'a LookupTable) -> Self {
        EntryClassifier {
            payments,
            transfers,
        }
    }

    /// Classify one entry; `None` means the entry produces no statement line
    pub fn classify(&self, entry: &LedgerEntry) -> Option<NormalizedRecord> {
        classify(entry, self.payments, self.transfers)
    }
}

/// Classify and enrich one ledger entry
///
/// Returns `None` for "Stripe Account" entries and for entries whose amount is zero.
pub fn classify(
    entry: &LedgerEntry,
    payments: &LookupTable,
    transfers: &LookupTable,
) -> Option<NormalizedRecord> {
    let category = AccountCategory::from_label(&entry.account);
    if category == AccountCategory::StripeAccount {
        return None;
    }

    let mut record = NormalizedRecord {
        date: entry.date,
        fitid: entry.memo.clone(),
        account: entry.account.clone(),
        trn_type: entry.trns_type.clone(),
        memo: entry.memo.clone(),
        currency: DEFAULT_CURRENCY.to_string(),
        amount: -entry.amount,
        name: entry.account.clone(),
    };

    match category {
        AccountCategory::ThirdParty => {
            record.name = entry.name.clone();
            if let Some((_, descriptor)) =
                lookup_id(&TRANSFER_FROM_STRIPE, &entry.memo, transfers)
            {
                record.memo = format!("{} | {}", descriptor, entry.memo);
            }
        }
        AccountCategory::Checking => {
            record.trn_type = "XFER".to_string();
            record.name = format!("Transfer to {}", entry.account);
            if let Some((_, descriptor)) = lookup_id(&TRANSFER_ID, &entry.memo, transfers) {
                record.memo = format!("{} | {}", descriptor, entry.memo);
                apply_currency(&mut record, descriptor);
            }
        }
        AccountCategory::ProcessingFees => {
            record.trn_type = "FEE".to_string();
            record.name = "Stripe".to_string();
            if let Some((charge_id, descriptor)) =
                lookup_id(&FEES_FOR_CHARGE, &entry.memo, payments)
            {
                record.memo = format!("{} | Processing Fees \n {}", entry.memo, descriptor);
                record.fitid = charge_id.to_string();
                apply_currency(&mut record, descriptor);
                record.name = format!("Stripe ({})", record.currency.to_uppercase());
            }
        }
        AccountCategory::Sales => {
            record.name = sales_name(entry).to_string();
            if let Some((charge_id, descriptor)) = lookup_id(&CHARGE_ID, &entry.memo, payments) {
                record.memo = format!("{} \n {}", descriptor, entry.memo);
                record.fitid = charge_id.to_string();
                apply_currency(&mut record, descriptor);
                if let Some(name) = descriptor_name(descriptor) {
                    record.name = name.to_string();
                }
            }
        }
        AccountCategory::Returns => {
            record.name = "Credit Card Refund".to_string();
            if let Some((charge_id, descriptor)) =
                lookup_id(&REFUND_OF_CHARGE, &entry.memo, payments)
            {
                record.memo = format!("{} Refund of Charge ID: {}", descriptor, charge_id);
                record.fitid = charge_id.to_string();
                apply_currency(&mut record, descriptor);
            }
        }
        AccountCategory::OtherIncome => {
            record.name = "Other Income".to_string();
        }
        AccountCategory::StripeAccount | AccountCategory::Other => {}
    }

    if record.trn_type.is_empty() {
        record.trn_type = if record.amount.is_sign_negative() {
            "DEBIT".to_string()
        } else {
            "CREDIT".to_string()
        };
    }

    if record.amount == Decimal::ZERO {
        debug!("Suppressing zero-amount entry on '{}'", entry.account);
        return None;
    }

    Some(record)
}

/// Extract the correlation id from a memo
pub fn extract_id<'m>(pattern: &Regex, memo: &'m str) -> Option<&'m str> {
    pattern
        .captures(memo)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract the id and look it up; a miss at either step is `None`
fn lookup_id<'m, 't>(
    pattern: &Regex,
    memo: &'m str,
    table: &'t LookupTable,
) -> Option<(&'m str, &'t str)> {
    let id = extract_id(pattern, memo)?;
    match table.get(id) {
        Some(descriptor) => Some((id, descriptor)),
        None => {
            debug!("No lookup entry for '{}'", id);
            None
        }
    }
}

fn apply_currency(record: &mut NormalizedRecord, descriptor: &str) {
    if let Some(currency) = descriptor_currency(descriptor) {
        record.currency = currency.to_string();
    }
}

fn sales_name(entry: &LedgerEntry) -> &str {
    if entry.memo.contains("Stripe Connect fee") {
        "Stripe Connect Charge"
    } else if entry.memo.contains("Charge") {
        "Credit Card Charge"
    } else {
        &entry.account
    }
}
