//! QBO (OFX 1.02 SGML) statement output
//!
//! [`write_qbo`] renders one statement; [`QboFileSink`] is the
//! [`StatementSink`] that writes every flushed batch to `<base>_<index>.qbo`
//! (plus an optional `<base>_<index>.csv` audit copy).

use crate::core::traits::StatementSink;
use crate::io::csv_format::write_records_csv;
use crate::types::{ConvertError, NormalizedRecord, StatementMetadata};
use chrono::NaiveDate;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// OFX 1.02 limit on the NAME element
const MAX_NAME_LEN: usize = 32;

const OFX_HEADER: &str = "OFXHEADER:100\n\
DATA:OFXSGML\n\
VERSION:102\n\
SECURITY:NONE\n\
ENCODING:USASCII\n\
CHARSET:1252\n\
COMPRESSION:NONE\n\
OLDFILEUID:NONE\n\
NEWFILEUID:NONE\n";

/// Render one statement as a QBO document
///
/// Transactions are written in slice order. Statement dates that are unknown
/// (every record undated) fall back to the server date; an undated record is
/// posted on the statement end date.
pub fn write_qbo(
    statement: &StatementMetadata,
    records: &[NormalizedRecord],
    output: &mut dyn Write,
) -> Result<(), ConvertError> {
    let server_date = statement.server_time;
    let start = statement.start.unwrap_or(server_date);
    let end = statement.end.unwrap_or(server_date);
    let as_of = statement.as_of.unwrap_or(end);

    writeln!(output, "{}", OFX_HEADER)?;
    writeln!(output, "<OFX>")?;

    writeln!(output, "<SIGNONMSGSRSV1>")?;
    writeln!(output, "<SONRS>")?;
    write_status(output)?;
    writeln!(output, "<DTSERVER>{}", server_date.format("%Y%m%d000000"))?;
    writeln!(output, "<LANGUAGE>ENG")?;
    writeln!(output, "<FI>")?;
    writeln!(output, "<ORG>{}", sgml(&statement.org))?;
    writeln!(output, "<FID>{}", sgml(&statement.fid))?;
    writeln!(output, "</FI>")?;
    writeln!(output, "</SONRS>")?;
    writeln!(output, "</SIGNONMSGSRSV1>")?;

    writeln!(output, "<BANKMSGSRSV1>")?;
    writeln!(output, "<STMTTRNRS>")?;
    writeln!(output, "<TRNUID>0")?;
    write_status(output)?;
    writeln!(output, "<STMTRS>")?;
    writeln!(output, "<CURDEF>USD")?;
    writeln!(output, "<BANKACCTFROM>")?;
    writeln!(output, "<BANKID>{}", sgml(&statement.bank_id))?;
    writeln!(output, "<ACCTID>{}", sgml(&statement.account_id))?;
    writeln!(output, "<ACCTTYPE>{}", sgml(&statement.account_type))?;
    writeln!(output, "</BANKACCTFROM>")?;

    writeln!(output, "<BANKTRANLIST>")?;
    writeln!(output, "<DTSTART>{}", ofx_date(start))?;
    writeln!(output, "<DTEND>{}", ofx_date(end))?;
    for record in records {
        write_transaction(output, record, end)?;
    }
    writeln!(output, "</BANKTRANLIST>")?;

    writeln!(output, "<LEDGERBAL>")?;
    writeln!(output, "<BALAMT>{}", statement.balance)?;
    writeln!(output, "<DTASOF>{}", ofx_date(as_of))?;
    writeln!(output, "</LEDGERBAL>")?;

    writeln!(output, "</STMTRS>")?;
    writeln!(output, "</STMTTRNRS>")?;
    writeln!(output, "</BANKMSGSRSV1>")?;
    writeln!(output, "</OFX>")?;

    Ok(())
}

fn write_status(output: &mut dyn Write) -> Result<(), ConvertError> {
    writeln!(output, "<STATUS>")?;
    writeln!(output, "<CODE>0")?;
    writeln!(output, "<SEVERITY>INFO")?;
    writeln!(output, "</STATUS>")?;
    Ok(())
}

fn write_transaction(
    output: &mut dyn Write,
    record: &NormalizedRecord,
    default_date: NaiveDate,
) -> Result<(), ConvertError> {
    writeln!(output, "<STMTTRN>")?;
    writeln!(output, "<TRNTYPE>{}", sgml(&record.trn_type))?;
    writeln!(
        output,
        "<DTPOSTED>{}",
        ofx_date(record.date.unwrap_or(default_date))
    )?;
    writeln!(output, "<TRNAMT>{}", record.amount)?;
    writeln!(output, "<FITID>{}", sgml(&record.fitid))?;
    writeln!(output, "<NAME>{}", sgml_truncated(&record.name, MAX_NAME_LEN))?;
    writeln!(output, "<MEMO>{}", sgml(&record.memo))?;
    writeln!(output, "<CURRENCY>")?;
    writeln!(output, "<CURRATE>1.0")?;
    writeln!(output, "<CURSYM>{}", sgml(&record.currency.to_uppercase()))?;
    writeln!(output, "</CURRENCY>")?;
    writeln!(output, "</STMTTRN>")?;
    Ok(())
}

fn ofx_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Escape an element value; SGML values end at the line break
fn sgml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut escaped, c);
    }
    escaped
}

/// Escape, then keep at most `max_len` characters of escaped text
///
/// An entity is either kept whole or dropped with everything after it.
fn sgml_truncated(text: &str, max_len: usize) -> String {
    let mut escaped = String::with_capacity(max_len);
    let mut piece = String::with_capacity(5);
    let mut len = 0;
    for c in text.chars() {
        piece.clear();
        push_escaped(&mut piece, c);
        let width = piece.chars().count();
        if len + width > max_len {
            break;
        }
        escaped.push_str(&piece);
        len += width;
    }
    escaped
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '\r' | '\n' => out.push(' '),
        _ => out.push(c),
    }
}

/// `<base>_<index>.<ext>`
pub fn numbered_path(base: &Path, index: usize, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!("_{}.{}", index, ext));
    PathBuf::from(name)
}

/// Writes each statement to its own numbered QBO file
#[derive(Debug, Clone)]
pub struct QboFileSink {
    base: PathBuf,
    audit_csv: bool,
    written: Vec<PathBuf>,
}

impl QboFileSink {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        QboFileSink {
            base: base.into(),
            audit_csv: false,
            written: Vec::new(),
        }
    }

    /// Also write a `<base>_<index>.csv` audit file per statement
    pub fn with_audit_csv(mut self, enabled: bool) -> Self {
        self.audit_csv = enabled;
        self
    }

    /// Paths of completely written files, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Create `path`, render into it and flush; the path is recorded only on success
    fn write_file<F>(&mut self, path: PathBuf, render: F) -> Result<(), ConvertError>
    where
        F: FnOnce(&mut dyn Write) -> Result<(), ConvertError>,
    {
        let file = File::create(&path).map_err(|e| ConvertError::IoError {
            message: format!("Failed to create file '{}': {}", path.display(), e),
        })?;
        let mut writer = BufWriter::new(file);
        render(&mut writer)?;
        writer.flush()?;

        self.written.push(path);
        Ok(())
    }
}

impl StatementSink for QboFileSink {
    fn write_statement(
        &mut self,
        index: usize,
        statement: &StatementMetadata,
        records: &[NormalizedRecord],
    ) -> Result<(), ConvertError> {
        let qbo_path = numbered_path(&self.base, index, "qbo");
        self.write_file(qbo_path, |out| write_qbo(statement, records, out))?;

        if self.audit_csv {
            let csv_path = numbered_path(&self.base, index, "csv");
            self.write_file(csv_path, |out| write_records_csv(records, out))?;
        }

        Ok(())
    }
}
