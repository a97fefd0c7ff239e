//! CSV audit rendering of a statement batch
//!
//! A human-checkable view of exactly what went into a QBO file, one row per
//! record with columns: Date, Name, Account, Memo, Amount.
//!
//! All functions write to any `Write` for easy testing.

use crate::types::{ConvertError, NormalizedRecord};
use serde::Serialize;
use std::io::Write;

/// One audit row
#[derive(Debug, Serialize)]
struct AuditRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Account")]
    account: &'a str,
    #[serde(rename = "Memo")]
    memo: String,
    #[serde(rename = "Amount")]
    amount: String,
}

impl<'a> From<&'a NormalizedRecord> for AuditRow<'a> {
    fn from(record: &'a NormalizedRecord) -> Self {
        AuditRow {
            date: record
                .date
                .map(|d| d.format("%m/%d/%Y").to_string())
                .unwrap_or_default(),
            name: &record.name,
            account: &record.account,
            memo: format!("{} {}", record.trn_type, record.memo),
            amount: record.amount.to_string(),
        }
    }
}

/// Write records as audit CSV
///
/// The header row is always written, even for an empty slice. The amount keeps
/// the decimal's own scale (`-10.00`, never `-10`).
pub fn write_records_csv(
    records: &[NormalizedRecord],
    output: &mut dyn Write,
) -> Result<(), ConvertError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);

    writer.write_record(["Date", "Name", "Account", "Memo", "Amount"])?;

    for record in records {
        writer.serialize(AuditRow::from(record))?;
    }

    writer.flush()?;

    Ok(())
}
