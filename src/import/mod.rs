//! Bank CSV import: normalization, header mapping, transaction building.
//!
//! The pipeline is three pure steps:
//!
//! 1. [`parse_csv`] — raw text to headers + rows with a detected delimiter
//! 2. [`guess_mapping`] — headers to a [`ColumnMapping`], via bank profiles
//! 3. [`build_transactions`] — rows + mapping to [`crate::core::BankTransaction`]s
//!
//! No step performs I/O and no step panics on malformed input.

mod csv;
mod mapping;
mod transaction;

pub use csv::{PREVIEW_ROWS, ParsedCsv, detect_delimiter, parse_csv, parse_line};
pub use mapping::{
    BankProfile, ColumnMapping, MappedField, MappingOutcome, detect_profile, find_header,
    guess_mapping, normalize_header,
};
pub use transaction::{build_transactions, normalize_date, parse_amount};
