//! Lookup tables built from Stripe's payments and transfers CSV exports
//!
//! The IIF ledger only carries Stripe object ids inside free-text memos. The
//! dashboard exports map those ids back to currency and customer details, which
//! this module folds into a single human-readable *descriptor* string per id.
//!
//! Stripe has exported the same logical report under several header sets over
//! time, so every row is tried against every known shape. A row may match more
//! than one shape; writes happen in shape order and the last write for a key wins.
//!
//! # Descriptor formats
//!
//! ```text
//! payments, `id` column:      [<Currency>] <Description> {<Card Name>} <Customer Email> | <Customer ID> | <Card Address State>
//! payments, `Source` column:  [<Currency>] <Description> | <id> |
//! transfers, `id` column:     [<Currency>]  | <Destination> | <Balance Transaction>
//! transfers, `Source` column: [<Currency>] <id>
//! transfers, `ID` column:     <Description>
//! ```
//!
//! The currency tag is always the first bracketed segment; see [`descriptor_currency`].

use crate::io::encoding::decode_field;
use crate::types::ConvertError;
use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Rendered in place of a missing currency column
const UNKNOWN_CURRENCY: &str = "???";

/// Correlation id -> descriptor mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    entries: HashMap<String, String>,
}

/// The two enrichment tables handed to the classifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTables {
    pub payments: LookupTable,
    pub transfers: LookupTable,
}

impl LookupTables {
    /// Load both tables; an absent path yields an empty table
    pub fn load(
        payments_file: Option<&Path>,
        transfers_file: Option<&Path>,
    ) -> Result<Self, ConvertError> {
        Ok(LookupTables {
            payments: LookupTable::load_payments(payments_file)?,
            transfers: LookupTable::load_transfers(transfers_file)?,
        })
    }
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for a correlation id, if known
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn insert(&mut self, id: impl Into<String>, descriptor: impl Into<String>) {
        self.entries.insert(id.into(), descriptor.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a payments table from an optional CSV path
    pub fn load_payments(path: Option<&Path>) -> Result<Self, ConvertError> {
        match path {
            Some(path) => Self::payments_from_reader(open_report(path)?),
            None => Ok(Self::new()),
        }
    }

    /// Load a transfers table from an optional CSV path
    pub fn load_transfers(path: Option<&Path>) -> Result<Self, ConvertError> {
        match path {
            Some(path) => Self::transfers_from_reader(open_report(path)?),
            None => Ok(Self::new()),
        }
    }

    /// Build a payments table from CSV data (payments or balance export)
    pub fn payments_from_reader<R: Read>(reader: R) -> Result<Self, ConvertError> {
        let mut table = Self::new();
        for_each_row(reader, |row| {
            let currency = row.get("Currency").unwrap_or(UNKNOWN_CURRENCY);
            let description = row.get_or_empty("Description");

            // Unified payments export
            if let Some(id) = row.get("id") {
                let descriptor = format!(
                    "[{}] {} {{{}}} {} | {} | {}",
                    currency,
                    description,
                    row.get_or_empty("Card Name"),
                    row.get_or_empty("Customer Email"),
                    row.get_or_empty("Customer ID"),
                    row.get_or_empty("Card Address State"),
                );
                table.insert(id, descriptor);
            }

            // Balance export
            if let Some(source) = row.get("Source") {
                let descriptor = format!(
                    "[{}] {} | {} | ",
                    currency,
                    description,
                    row.get_or_empty("id"),
                );
                table.insert(source, descriptor);
            }
        })?;
        Ok(table)
    }

    /// Build a transfers table from CSV data (payouts, balance or legacy export)
    pub fn transfers_from_reader<R: Read>(reader: R) -> Result<Self, ConvertError> {
        let mut table = Self::new();
        for_each_row(reader, |row| {
            let currency = row.get("Currency").unwrap_or(UNKNOWN_CURRENCY);

            // Payouts export
            if let Some(id) = row.get("id") {
                let descriptor = format!(
                    "[{}]  | {} | {}",
                    currency,
                    row.get_or_empty("Destination"),
                    row.get_or_empty("Balance Transaction"),
                );
                table.insert(id, descriptor);
            }

            // Balance export
            if let Some(source) = row.get("Source") {
                let descriptor = format!("[{}] {}", currency, row.get_or_empty("id"));
                table.insert(source, descriptor);
            }

            // Legacy export
            if let Some(id) = row.get("ID") {
                table.insert(id, row.get_or_empty("Description"));
            }
        })?;
        Ok(table)
    }
}

/// Currency tag of a descriptor: the text between the first `[` and the next `]`
///
/// Returns `None` when the descriptor has no bracketed segment.
pub fn descriptor_currency(descriptor: &str) -> Option<&str> {
    delimited(descriptor, '[', ']')
}

/// Customer name of a payments descriptor: the text between `{` and `}`
///
/// Returns `None` when the segment is missing or blank.
pub fn descriptor_name(descriptor: &str) -> Option<&str> {
    delimited(descriptor, '{', '}')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn delimited(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)? + open.len_utf8();
    let len = text[start..].find(close)?;
    Some(&text[start..start + len])
}

fn open_report(path: &Path) -> Result<File, ConvertError> {
    if !path.exists() {
        return Err(ConvertError::file_not_found(path));
    }
    File::open(path).map_err(|e| ConvertError::IoError {
        message: format!("Failed to open file '{}': {}", path.display(), e),
    })
}

/// One CSV row addressed by header name
struct Row<'a> {
    headers: &'a [String],
    values: Vec<String>,
}

impl Row<'_> {
    /// Value of the first column with this exact header; empty cells count as absent
    fn get(&self, column: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.values
            .get(idx)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }
}

/// Stream a headed CSV; fields that are not UTF-8 are read as Windows-1252
fn for_each_row<R, F>(reader: R, mut f: F) -> Result<(), ConvertError>
where
    R: Read,
    F: FnMut(&Row),
{
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| {
            decode_field(h)
                .trim_start_matches('\u{feff}')
                .to_string()
        })
        .collect();

    for record in reader.byte_records() {
        let record = record?;
        let row = Row {
            headers: &headers,
            values: record
                .iter()
                .map(|v| decode_field(v).into_owned())
                .collect(),
        };
        f(&row);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_payments_unified_export() {
        let csv = "id,Description,Currency,Card Name,Customer Email,Customer ID,Card Address State\n\
                   ch_1,A sale,usd,Acme,a@b.com,cus_9,CA\n";
        let table = LookupTable::payments_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("ch_1"),
            Some("[usd] A sale {Acme} a@b.com | cus_9 | CA")
        );
    }

    #[test]
    fn test_payments_balance_export() {
        let csv = "id,Source,Description,Currency\ntxn_1,ch_2,Payment,eur\n";
        let table = LookupTable::payments_from_reader(csv.as_bytes()).unwrap();

        // The row matches both shapes, keyed by different columns
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("ch_2"), Some("[eur] Payment | txn_1 | "));
        assert_eq!(table.get("txn_1"), Some("[eur] Payment {}  |  | "));
    }

    #[test]
    fn test_payments_missing_fields_render_empty() {
        let csv = "id\nch_3\n";
        let table = LookupTable::payments_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.get("ch_3"), Some("[???]  {}  |  | "));
    }

    #[test]
    fn test_payments_last_row_wins() {
        let csv = "id,Currency\nch_1,usd\nch_1,gbp\n";
        let table = LookupTable::payments_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(descriptor_currency(table.get("ch_1").unwrap()), Some("gbp"));
    }

    #[test]
    fn test_same_key_from_two_shapes_last_shape_wins() {
        // `Source` shape is applied after the `id` shape
        let csv = "id,Source,Currency\nx,x,cad\n";
        let table = LookupTable::payments_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.get("x"), Some("[cad]  | x | "));
    }

    #[test]
    fn test_empty_id_cell_is_skipped() {
        let csv = "id,Currency\n,usd\n";
        let table = LookupTable::payments_from_reader(csv.as_bytes()).unwrap();

        assert!(table.is_empty());
    }

    #[rstest]
    #[case::payouts(
        "id,Currency,Destination,Balance Transaction\npo_1,usd,ba_1,txn_1\n",
        "po_1",
        "[usd]  | ba_1 | txn_1"
    )]
    #[case::balance("Source,id,Currency\npo_2,txn_2,eur\n", "po_2", "[eur] txn_2")]
    #[case::legacy("ID,Description\ntr_3,Weekly payout\n", "tr_3", "Weekly payout")]
    fn test_transfer_shapes(#[case] csv: &str, #[case] key: &str, #[case] expected: &str) {
        let table = LookupTable::transfers_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.get(key), Some(expected));
    }

    #[test]
    fn test_headers_are_case_sensitive() {
        // `id` and `ID` are distinct shapes
        let csv = "ID,Description,Currency\ntr_1,Payout,usd\n";
        let table = LookupTable::transfers_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("tr_1"), Some("Payout"));
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let csv = "\u{feff}id,Currency\nch_1,usd\n";
        let table = LookupTable::payments_from_reader(csv.as_bytes()).unwrap();

        assert!(table.get("ch_1").is_some());
    }

    #[test]
    fn test_windows_1252_export_is_decoded() {
        let csv = b"id,Description,Currency,Card Name\nch_1,Caf\xE9,eur,Ren\xE9e\n";
        let table = LookupTable::payments_from_reader(&csv[..]).unwrap();

        let descriptor = table.get("ch_1").unwrap();
        assert_eq!(descriptor, "[eur] Café {Renée}  |  | ");
        assert_eq!(descriptor_name(descriptor), Some("Renée"));
    }

    #[test]
    fn test_absent_reports_yield_empty_tables() {
        let tables = LookupTables::load(None, None).unwrap();
        assert!(tables.payments.is_empty());
        assert!(tables.transfers.is_empty());
    }

    #[test]
    fn test_missing_report_file_is_an_error() {
        let result = LookupTable::load_payments(Some(Path::new("does-not-exist.csv")));
        assert!(matches!(result, Err(ConvertError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(b"Source,id,Currency\npo_9,txn_9,usd\n")
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");

        let table = LookupTable::load_transfers(Some(file.path())).unwrap();
        assert_eq!(table.get("po_9"), Some("[usd] txn_9"));
    }

    #[rstest]
    #[case::simple("[EUR] desc | x | y", Some("EUR"))]
    #[case::first_bracket_wins("[usd] [gbp]", Some("usd"))]
    #[case::unknown("[???]  | ba_1 | txn", Some("???"))]
    #[case::no_brackets("Weekly payout", None)]
    #[case::unclosed("[usd desc", None)]
    #[case::empty("", None)]
    fn test_descriptor_currency(#[case] descriptor: &str, #[case] expected: Option<&str>) {
        assert_eq!(descriptor_currency(descriptor), expected);
    }

    #[rstest]
    #[case::present("[usd] A sale {Acme} a@b.com | c | CA", Some("Acme"))]
    #[case::padded("[usd] x { Jane Doe } y", Some("Jane Doe"))]
    #[case::blank("[usd] x {} y", None)]
    #[case::absent("[usd] x | txn | ", None)]
    fn test_descriptor_name(#[case] descriptor: &str, #[case] expected: Option<&str>) {
        assert_eq!(descriptor_name(descriptor), expected);
    }
}
