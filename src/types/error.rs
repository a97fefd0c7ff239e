//! Error types for the IIF to QBO converter
//!
//! Every error in this module is fatal: it aborts the conversion before or while
//! reading input. Data-quality anomalies in the ledger (a memo that does not carry
//! a correlation id, an id missing from the lookup tables, an unknown account label)
//! are not errors at all; the classifier falls back to its category defaults.
//!
//! # Error Categories
//!
//! - **Configuration Errors**: Missing required values or input paths
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **Parsing Errors**: Malformed CSV/IIF rows, amounts or dates

use thiserror::Error;

/// Main error type for the converter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// A required configuration value was not supplied
    #[error("Missing required configuration: {field}")]
    MissingConfig {
        /// Name of the missing setting
        field: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Structural CSV or IIF error
    #[error("Parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Ledger amount that is not a decimal number
    #[error("Invalid amount '{amount}' at line {line}")]
    InvalidAmount {
        /// The offending amount text
        amount: String,
        /// Line number in the IIF file
        line: u64,
    },

    /// Ledger date that matches none of the accepted formats
    #[error("Invalid date '{date}' at line {line}")]
    InvalidDate {
        /// The offending date text
        date: String,
        /// Line number in the IIF file
        line: u64,
    },

    /// IIF data row seen before its `!` header row
    #[error("{kind} row at line {line} has no !{kind} header")]
    MissingHeader {
        /// Row kind (TRNS, SPL)
        kind: String,
        /// Line number in the IIF file
        line: u64,
    },
}

impl From<std::io::Error> for ConvertError {
    fn from(error: std::io::Error) -> Self {
        ConvertError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for ConvertError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        ConvertError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl ConvertError {
    /// Create a MissingConfig error
    pub fn missing_config(field: &str) -> Self {
        ConvertError::MissingConfig {
            field: field.to_string(),
        }
    }

    /// Create a FileNotFound error
    pub fn file_not_found(path: &std::path::Path) -> Self {
        ConvertError::FileNotFound {
            path: path.display().to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, line: u64) -> Self {
        ConvertError::InvalidAmount {
            amount: amount.to_string(),
            line,
        }
    }

    /// Create an InvalidDate error
    pub fn invalid_date(date: &str, line: u64) -> Self {
        ConvertError::InvalidDate {
            date: date.to_string(),
            line,
        }
    }

    /// Create a MissingHeader error
    pub fn missing_header(kind: &str, line: u64) -> Self {
        ConvertError::MissingHeader {
            kind: kind.to_string(),
            line,
        }
    }
}
