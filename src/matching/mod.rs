//! Transaction↔invoice matching with explainable confidence.
//!
//! Scoring is pure and synchronous: a batch is scored against one fetched
//! snapshot of open invoices, with no cross-transaction dependency.

mod engine;
mod payment;
mod score;

pub use engine::{NOTE_NO_MATCH, NOTE_ZERO_AMOUNT, confidence_label, match_batch, propose_match};
pub use payment::{PaymentProvenance, PaymentRegistration, build_payment_registration};
pub use score::{
    AMOUNT_BASE, AMOUNT_DIFF_PENALTY, AMOUNT_TOLERANCE, COUNTERPARTY_BONUS, CandidateScore,
    DATE_BONUS_MAX, DATE_DAY_PENALTY, DATE_WINDOW_DAYS, HIGH_CONFIDENCE, INVOICE_NUMBER_BONUS,
    MEDIUM_CONFIDENCE, OCR_BONUS, confidence_for, score_candidate,
};
