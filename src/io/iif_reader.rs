//! Streaming IIF reader with iterator interface
//!
//! Reads a QuickBooks IIF export and yields one [`TransactionGroup`] per ledger
//! transaction. IIF is tab-separated; every row starts with a kind keyword:
//!
//! ```text
//! !TRNS   TRNSID  TRNSTYPE         DATE        ACCNT          NAME  AMOUNT  MEMO
//! !SPL    SPLID   TRNSTYPE         DATE        ACCNT          NAME  AMOUNT  MEMO
//! !ENDTRNS
//! TRNS            GENERAL JOURNAL  03/15/2024  Stripe Account        9.41    Charge ID: ch_1
//! SPL             GENERAL JOURNAL  03/15/2024  Stripe Sales          -10.00  Charge ID: ch_1
//! SPL             GENERAL JOURNAL  03/15/2024  Stripe Payment Processing Fees  0.59  Fees for charge ID: ch_1
//! ENDTRNS
//! ```
//!
//! Rows starting with `!` declare the columns for that kind. `TRNS` opens a
//! group, `SPL` adds to it and `ENDTRNS` closes it. Other kinds (account and
//! class lists) are skipped.
//!
//! # Error Handling
//!
//! - Fatal errors opening the file are returned from `new()`
//! - Malformed amounts and dates are yielded as `Err` items and should abort the run
//! - Line numbers are included in every row-level error

use crate::io::encoding::decode_field;
use crate::types::{ConvertError, LedgerEntry, TransactionGroup};
use chrono::{Datelike, NaiveDate};
use csv::{ByteRecord, ReaderBuilder, Trim};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// `%Y` also accepts two digits, so short years need their own format
const SHORT_YEAR_FORMAT: &str = "%m/%d/%y";

/// Streaming IIF reader
///
/// # Examples
///
/// ```no_run
/// use stripe_iif_to_qbo::io::IifReader;
/// use std::path::Path;
///
/// let reader = IifReader::new(Path::new("stripe.iif")).unwrap();
/// for group in reader {
///     let group = group.unwrap();
///     println!("{} entries", group.entries.len());
/// }
/// ```
#[derive(Debug)]
pub struct IifReader<R = File> {
    reader: csv::Reader<R>,
    record: ByteRecord,
    headers: HashMap<String, Vec<String>>,
    current: Option<TransactionGroup>,
}

impl IifReader<File> {
    /// Open an IIF file for streaming
    pub fn new(path: &Path) -> Result<Self, ConvertError> {
        if !path.exists() {
            return Err(ConvertError::file_not_found(path));
        }
        let file = File::open(path).map_err(|e| ConvertError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> IifReader<R> {
    /// Wrap any byte source
    ///
    /// Quoting is disabled: IIF has no escaping rules and memos may contain
    /// stray quote characters.
    pub fn from_reader(reader: R) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .trim(Trim::All)
            .buffer_capacity(8 * 1024)
            .from_reader(reader);

        IifReader {
            reader,
            record: ByteRecord::new(),
            headers: HashMap::new(),
            current: None,
        }
    }

    fn parse_entry(
        &self,
        kind: &str,
        fields: &[String],
        line: u64,
    ) -> Result<LedgerEntry, ConvertError> {
        let columns = self
            .headers
            .get(kind)
            .ok_or_else(|| ConvertError::missing_header(kind, line))?;

        let column = |name: &str| column_value(columns, fields, name);

        Ok(LedgerEntry {
            trns_type: column("trnstype").to_string(),
            date: parse_date(column("date"), line)?,
            account: column("accnt").to_string(),
            name: column("name").to_string(),
            memo: column("memo").to_string(),
            amount: parse_amount(column("amount"), line)?,
        })
    }

    fn next_group(&mut self) -> Result<Option<TransactionGroup>, ConvertError> {
        loop {
            if !self.reader.read_byte_record(&mut self.record)? {
                return Ok(self.current.take());
            }

            let line = self.record.position().map(|p| p.line()).unwrap_or(0);
            let fields: Vec<String> = self.record.iter().map(decode_cell).collect();
            let Some(kind) = fields.first().map(|k| k.to_ascii_uppercase()) else {
                continue;
            };

            if let Some(declared) = kind.strip_prefix('!') {
                let columns = fields[1..].iter().map(|c| c.to_ascii_lowercase()).collect();
                self.headers.insert(declared.to_string(), columns);
                continue;
            }

            match kind.as_str() {
                "TRNS" => {
                    let entry = self.parse_entry("TRNS", &fields, line)?;
                    let group = TransactionGroup {
                        entries: vec![entry],
                    };
                    // An unterminated transaction ends where the next one starts
                    if let Some(previous) = self.current.replace(group) {
                        return Ok(Some(previous));
                    }
                }
                "SPL" => {
                    let entry = self.parse_entry("SPL", &fields, line)?;
                    self.current
                        .get_or_insert_with(TransactionGroup::default)
                        .entries
                        .push(entry);
                }
                "ENDTRNS" => {
                    if let Some(group) = self.current.take() {
                        return Ok(Some(group));
                    }
                }
                _ => {}
            }
        }
    }
}

impl<R: Read> Iterator for IifReader<R> {
    type Item = Result<TransactionGroup, ConvertError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_group().transpose()
    }
}

/// Value under a declared column; the kind keyword occupies the first cell
fn column_value<'f>(columns: &[String], fields: &'f [String], name: &str) -> &'f str {
    columns
        .iter()
        .position(|c| c == name)
        .and_then(|idx| fields.get(idx + 1))
        .map(String::as_str)
        .unwrap_or("")
}

/// Decode one IIF cell; surrounding quotes are removed
fn decode_cell(raw: &[u8]) -> String {
    let text = decode_field(raw);
    let text = text.trim();
    match text
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => text.to_string(),
    }
}

/// Parse a ledger amount; thousands separators are accepted
pub fn parse_amount(raw: &str, line: u64) -> Result<Decimal, ConvertError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(ConvertError::invalid_amount(raw, line));
    }
    Decimal::from_str(&cleaned).map_err(|_| ConvertError::invalid_amount(raw, line))
}

/// Parse a ledger date; an empty cell is `None`
pub fn parse_date(raw: &str, line: u64) -> Result<Option<NaiveDate>, ConvertError> {
    if raw.is_empty() {
        return Ok(None);
    }
    if has_short_year(raw) {
        return NaiveDate::parse_from_str(raw, SHORT_YEAR_FORMAT)
            .map(Some)
            .map_err(|_| ConvertError::invalid_date(raw, line));
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .filter(|date| date.year() >= 1000)
        .map(Some)
        .ok_or_else(|| ConvertError::invalid_date(raw, line))
}

/// `m/d/yy`: the segment after the last slash is exactly two digits
fn has_short_year(raw: &str) -> bool {
    match raw.rsplit_once('/') {
        Some((_, year)) => year.len() == 2 && year.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
