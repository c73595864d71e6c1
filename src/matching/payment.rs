//! Payment-registration payloads for approved matches.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::identity::validate_ocr;
use crate::core::{Confidence, InvoiceKind, KonteraError, MatchResult};

/// What gets sent to the ledger when a match is approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRegistration {
    pub invoice_kind: InvoiceKind,
    pub invoice_number: String,
    /// Positive payment amount, capped at the invoice's open amount.
    pub amount: Decimal,
    /// The bank booking date.
    pub date: NaiveDate,
    /// Payment reference: the transaction's OCR when its check digit
    /// holds, else the bank reference, else the transaction id.
    pub reference: String,
    /// Audit trail back to the bank row and the match explanation.
    pub provenance: PaymentProvenance,
}

/// Full provenance of an approved match, for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProvenance {
    pub transaction_id: String,
    /// The original CSV row, keyed by header.
    pub raw: BTreeMap<String, String>,
    /// The match explanation shown to the user at approval time.
    pub match_note: String,
    pub confidence: Option<Confidence>,
}

/// Build the registration payload for an approved match result.
///
/// Fails when the result carries no match — approval of an unmatched
/// transaction is a caller bug, not a recoverable state.
pub fn build_payment_registration(result: &MatchResult) -> Result<PaymentRegistration, KonteraError> {
    let matched = result.matched.as_ref().ok_or_else(|| {
        KonteraError::Matching(format!(
            "transaction {} has no match to approve",
            result.transaction.id
        ))
    })?;

    let tx = &result.transaction;
    let reference = tx
        .ocr
        .as_deref()
        .filter(|ocr| validate_ocr(ocr).is_ok())
        .or(tx.reference.as_deref())
        .unwrap_or(&tx.id)
        .to_string();

    Ok(PaymentRegistration {
        invoice_kind: matched.kind,
        invoice_number: matched.invoice.number.clone(),
        amount: tx.amount.abs().min(matched.invoice.open_amount()),
        date: tx.date,
        reference,
        provenance: PaymentProvenance {
            transaction_id: tx.id.clone(),
            raw: tx.raw.clone(),
            match_note: result.note.clone().unwrap_or_default(),
            confidence: result.confidence,
        },
    })
}
