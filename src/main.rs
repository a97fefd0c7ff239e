//! Stripe IIF to QBO CLI
//!
//! Command-line interface for converting a Stripe IIF export into QBO files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- -a 1234 -o out/stripe stripe.iif
//! cargo run -- -a 1234 -p payments.csv -t transfers.csv -o out/stripe stripe.iif
//! cargo run -- -a 1234 -s 2024-04-01 --csv -o out/stripe stripe.iif
//! ```
//!
//! The program writes `out/stripe_0.qbo`, `out/stripe_1.qbo`, ... with at most
//! 500 transactions each. Set `RUST_LOG=debug` to see skipped entries and
//! lookup misses.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing input, unreadable file, malformed amount, etc.)

use log::{error, info};
use std::process;
use stripe_iif_to_qbo::cli;
use stripe_iif_to_qbo::core::Converter;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::parse_args();
    let converter = Converter::new(args.to_config());

    match converter.run() {
        Ok(summary) => info!(
            "Wrote {} transactions to {} statement files",
            summary.records_written, summary.statements_written
        ),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
