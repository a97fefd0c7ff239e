//! I/O module
//!
//! Handles IIF input and statement output.
//!
//! # Components
//!
//! - `iif_reader` - Streaming IIF reader with iterator interface
//! - `qbo` - QBO (OFX) statement rendering and the numbered-file sink
//! - `csv_format` - CSV audit rendering of a batch
//! - `encoding` - UTF-8 / Windows-1252 decoding of exported fields

pub mod csv_format;
pub mod encoding;
pub mod iif_reader;
pub mod qbo;

pub use csv_format::write_records_csv;
pub use encoding::decode_field;
pub use iif_reader::IifReader;
pub use qbo::{write_qbo, QboFileSink};
