//! # kontera
//!
//! Bookkeeping automation for Swedish small businesses: bank CSV import,
//! transaction↔invoice matching, posting verification against the BAS
//! chart of accounts, and rule-gated correction vouchers.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating
//! point. The crate is a pure core: it performs no file I/O, no HTTP, and
//! no OAuth; hosts feed it raw export text and implement the
//! [`ledger::LedgerProvider`] seam.
//!
//! ## Quick Start
//!
//! ```rust
//! use kontera::core::{InvoiceCandidate, InvoiceKind};
//! use kontera::import::{build_transactions, guess_mapping, parse_csv};
//! use kontera::matching::match_batch;
//! use rust_decimal_macros::dec;
//!
//! let csv = "Bokföringsdag;Text;Belopp\n2026-01-10;Faktura 100 OCR 1234566;-625,00\n";
//! let parsed = parse_csv(csv).unwrap();
//! let outcome = guess_mapping(&parsed.headers);
//! assert!(outcome.missing.is_empty());
//!
//! let transactions = build_transactions(&parsed, &outcome.mapping);
//! let suppliers = vec![
//!     InvoiceCandidate::new(InvoiceKind::Supplier, "100", "Telia Sverige AB", dec!(625.00))
//!         .ocr("1234566"),
//! ];
//!
//! let results = match_batch(&transactions, &suppliers, &[]);
//! assert_eq!(results[0].confidence.unwrap().label(), "Hög");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Value types, errors, BAS accounts, Swedish identifiers |
//! | `import` | CSV normalization, header mapping, transaction building |
//! | `matching` | Multi-signal invoice matching with confidence tiers |
//! | `posting` | Posting traces, invariant checks, issue classification |
//! | `correction` | Correction-voucher planning and validation |
//! | `ledger` | Async provider seams, trace cache, reconciliation service |
//!
//! All features are on by default; hosts that only need the pure layers
//! can opt down with `default-features = false`.

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "import")]
pub mod import;

#[cfg(feature = "matching")]
pub mod matching;

#[cfg(feature = "posting")]
pub mod posting;

#[cfg(feature = "correction")]
pub mod correction;

#[cfg(feature = "ledger")]
pub mod ledger;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
