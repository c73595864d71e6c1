//! Multi-signal confidence scoring for transaction↔invoice pairs.
//!
//! Every weight is a named constant so the model can be tuned signal by
//! signal. Scores feed the confidence tiers in [`Confidence`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::identity::{digits_only, normalize_text};
use crate::core::{BankTransaction, Confidence, InvoiceCandidate};

/// Maximum allowed difference between |transaction amount| and invoice
/// amount, in currency units. Anything beyond is rejected outright.
pub const AMOUNT_TOLERANCE: Decimal = dec!(1);

/// Score of an exact amount match; decays by [`AMOUNT_DIFF_PENALTY`]
/// per currency unit of difference.
pub const AMOUNT_BASE: Decimal = dec!(40);
pub const AMOUNT_DIFF_PENALTY: Decimal = dec!(10);

/// The invoice OCR reference was found among the transaction's digits.
pub const OCR_BONUS: Decimal = dec!(40);

/// The invoice number was found among the transaction's digits.
/// Scored independently of the OCR signal.
pub const INVOICE_NUMBER_BONUS: Decimal = dec!(25);

/// The counterparty name appears in the transaction text.
pub const COUNTERPARTY_BONUS: Decimal = dec!(15);

/// Due-date proximity: full bonus on the due date itself, decaying by
/// [`DATE_DAY_PENALTY`] per day, zero outside [`DATE_WINDOW_DAYS`].
pub const DATE_BONUS_MAX: Decimal = dec!(14);
pub const DATE_DAY_PENALTY: Decimal = dec!(2);
pub const DATE_WINDOW_DAYS: i64 = 7;

/// Confidence tier thresholds.
pub const HIGH_CONFIDENCE: Decimal = dec!(85);
pub const MEDIUM_CONFIDENCE: Decimal = dec!(60);

/// A candidate's composite score and the signals that produced it.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub score: Decimal,
    /// Human-readable signal descriptions, amount first.
    pub signals: Vec<String>,
}

/// Swedish amount formatting for notes (comma decimal separator).
pub(crate) fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount).replace('.', ",")
}

/// All digits the transaction carries, across reference, OCR,
/// description, and counterparty.
fn transaction_digits(tx: &BankTransaction) -> String {
    let mut digits = String::new();
    for part in [
        tx.reference.as_deref(),
        tx.ocr.as_deref(),
        Some(tx.description.as_str()),
        tx.counterparty.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        digits.push_str(&digits_only(part));
    }
    digits
}

/// All text the transaction carries, normalized for name comparison.
fn transaction_text(tx: &BankTransaction) -> String {
    let mut text = String::new();
    for part in [
        Some(tx.description.as_str()),
        tx.counterparty.as_deref(),
        tx.reference.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        text.push_str(&normalize_text(part));
    }
    text
}

/// Score one invoice candidate against a transaction.
///
/// Returns `None` when the amounts differ by more than
/// [`AMOUNT_TOLERANCE`]; otherwise the composite score with its signal
/// explanations, the amount signal always first.
pub fn score_candidate(tx: &BankTransaction, invoice: &InvoiceCandidate) -> Option<CandidateScore> {
    let invoice_amount = invoice.open_amount();
    let diff = (tx.amount.abs() - invoice_amount).abs();
    if diff > AMOUNT_TOLERANCE {
        return None;
    }

    let mut signals = Vec::new();
    let mut score = (AMOUNT_BASE - diff * AMOUNT_DIFF_PENALTY).max(Decimal::ZERO);
    if diff.is_zero() {
        signals.push(format!("belopp {} kr stämmer exakt", format_amount(invoice_amount)));
    } else {
        signals.push(format!(
            "belopp inom tolerans (avvikelse {} kr)",
            format_amount(diff)
        ));
    }

    let tx_digits = transaction_digits(tx);

    if let Some(ocr) = invoice.ocr.as_deref() {
        let ocr_digits = digits_only(ocr);
        if !ocr_digits.is_empty() && tx_digits.contains(&ocr_digits) {
            score += OCR_BONUS;
            signals.push(format!("OCR {ocr_digits} återfinns i referensen"));
        }
    }

    let number_digits = digits_only(&invoice.number);
    if !number_digits.is_empty() && tx_digits.contains(&number_digits) {
        score += INVOICE_NUMBER_BONUS;
        signals.push(format!(
            "fakturanummer {} återfinns i transaktionstexten",
            invoice.number
        ));
    }

    let name = normalize_text(&invoice.counterparty_name);
    if !name.is_empty() && transaction_text(tx).contains(&name) {
        score += COUNTERPARTY_BONUS;
        signals.push(format!(
            "motpart {} återfinns i transaktionstexten",
            invoice.counterparty_name
        ));
    }

    if let Some(due) = invoice.due_date {
        let days = (tx.date - due).num_days().abs();
        if days <= DATE_WINDOW_DAYS {
            let bonus =
                (DATE_BONUS_MAX - Decimal::from(days) * DATE_DAY_PENALTY).max(Decimal::ZERO);
            score += bonus;
            signals.push(format!("förfallodatum inom {days} dagar"));
        }
    }

    Some(CandidateScore { score, signals })
}

/// Confidence tier for a composite score.
pub fn confidence_for(score: Decimal) -> Confidence {
    if score >= HIGH_CONFIDENCE {
        Confidence::High
    } else if score >= MEDIUM_CONFIDENCE {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}
