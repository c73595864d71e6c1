//! Correction form validation.
//!
//! The form holds raw user-editable strings; only [`validate_correction`]
//! turns it into a [`CorrectionProposal`]. Validation fails fast on the
//! first violation with a field-specific Swedish message — there is no
//! partial submission.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::accounts::is_valid_bas_account;
use crate::core::{CorrectionProposal, CorrectionSide, InvoiceKind, ValidationError};

/// Maximum length of a voucher series identifier.
const MAX_SERIES_LEN: usize = 6;

/// A correction-voucher form as edited by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionForm {
    pub invoice_kind: InvoiceKind,
    pub invoice_id: String,
    pub side: CorrectionSide,
    pub from_account: String,
    pub to_account: String,
    /// Amount as entered; both `,` and `.` decimal separators accepted.
    pub amount: String,
    pub voucher_series: String,
    /// Strict ISO date (YYYY-MM-DD).
    pub transaction_date: String,
    pub reason: String,
}

/// Validate a form into a submission-ready proposal.
pub fn validate_correction(form: &CorrectionForm) -> Result<CorrectionProposal, ValidationError> {
    let from_account = form.from_account.trim();
    if !is_valid_bas_account(from_account) {
        return Err(ValidationError::new(
            "from_account",
            format!("ogiltigt BAS-konto: {} (ska vara 4 siffror, 1000–9999)", form.from_account),
        ));
    }

    let to_account = form.to_account.trim();
    if !is_valid_bas_account(to_account) {
        return Err(ValidationError::new(
            "to_account",
            format!("ogiltigt BAS-konto: {} (ska vara 4 siffror, 1000–9999)", form.to_account),
        ));
    }

    if from_account == to_account {
        return Err(ValidationError::new(
            "to_account",
            "från- och till-konto måste vara olika",
        ));
    }

    let amount: Decimal = form
        .amount
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| ValidationError::new("amount", "beloppet kunde inte tolkas"))?;
    if amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount", "beloppet måste vara större än 0"));
    }
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    let series = form.voucher_series.trim();
    if series.is_empty()
        || series.len() > MAX_SERIES_LEN
        || !series.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ValidationError::new(
            "voucher_series",
            "verifikationsserie ska vara 1–6 bokstäver eller siffror",
        ));
    }

    let transaction_date = NaiveDate::parse_from_str(form.transaction_date.trim(), "%Y-%m-%d")
        .map_err(|_| {
            ValidationError::new("transaction_date", "datum ska anges som ÅÅÅÅ-MM-DD")
        })?;

    let reason = form.reason.trim();
    if reason.is_empty() {
        return Err(ValidationError::new("reason", "ange en motivering för rättelsen"));
    }

    Ok(CorrectionProposal {
        invoice_kind: form.invoice_kind,
        invoice_id: form.invoice_id.clone(),
        side: form.side,
        from_account: from_account.to_string(),
        to_account: to_account.to_string(),
        amount,
        voucher_series: series.to_string(),
        transaction_date,
        reason: reason.to_string(),
    })
}
