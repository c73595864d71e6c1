//! Shared value types, errors, and Swedish accounting data.
//!
//! Everything downstream (import, matching, posting, correction) builds on
//! the immutable value objects defined here. All monetary values use
//! [`rust_decimal::Decimal`].

pub mod accounts;
mod error;
pub mod identity;
mod types;

pub use error::*;
pub use types::*;

pub use accounts::{ControlAccounts, account_by_number, is_valid_bas_account, is_vat_account};
