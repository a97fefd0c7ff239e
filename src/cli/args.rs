use crate::core::{BatchConfig, ConvertConfig};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;

/// Convert a Stripe IIF export into QBO bank statements
#[derive(Parser, Debug)]
#[command(name = "stripe-iif-to-qbo")]
#[command(about = "Convert a Stripe IIF export into QBO bank statements", long_about = None)]
pub struct CliArgs {
    /// IIF ledger export from Stripe
    #[arg(value_name = "INPUT", help = "Path to the IIF file")]
    pub input_file: PathBuf,

    /// Account id written into every statement
    #[arg(short = 'a', long = "account-id", value_name = "ID")]
    pub account_id: String,

    /// Payments report used to enrich charges, fees and refunds
    #[arg(short = 'p', long = "payments", value_name = "CSV")]
    pub payments_file: Option<PathBuf>,

    /// Transfers report used to enrich payouts
    #[arg(short = 't', long = "transfers", value_name = "CSV")]
    pub transfers_file: Option<PathBuf>,

    /// Server / as-of date (YYYY-MM-DD)
    #[arg(
        short = 's',
        long = "server-time",
        value_name = "DATE",
        help = "Server date written into statements (default: today)"
    )]
    pub server_time: Option<NaiveDate>,

    /// Output base path
    #[arg(
        short = 'o',
        long = "output",
        value_name = "BASE",
        help = "Output base path; files are written as <BASE>_<n>.qbo"
    )]
    pub output: PathBuf,

    /// Transactions per statement
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Transactions per statement file (default: 500)"
    )]
    pub batch_size: Option<usize>,

    /// Also write an audit CSV next to each statement
    #[arg(long = "csv")]
    pub audit_csv: bool,
}

impl CliArgs {
    /// Create a ConvertConfig from CLI arguments
    ///
    /// Missing optional values fall back to defaults: today's local date for the
    /// server time and [`BatchConfig::default`] for the batch size.
    pub fn to_config(&self) -> ConvertConfig {
        let batch = match self.batch_size {
            Some(size) => BatchConfig::new(size),
            None => BatchConfig::default(),
        };

        ConvertConfig {
            account_id: self.account_id.clone(),
            iif_file: self.input_file.clone(),
            payments_file: self.payments_file.clone(),
            transfers_file: self.transfers_file.clone(),
            server_time: self
                .server_time
                .unwrap_or_else(|| Local::now().date_naive()),
            output_base: self.output.clone(),
            batch,
            audit_csv: self.audit_csv,
        }
    }
}
