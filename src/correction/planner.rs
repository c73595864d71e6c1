//! Rule-gated correction proposals for misposted customer invoices.

use chrono::NaiveDate;

use crate::core::{CorrectionSide, InvoiceKind, PostingRow};
use crate::posting::{InvoicePostingTrace, IssueCode, VerifyConfig};

use super::form::CorrectionForm;

/// Whether a trace qualifies for an automatic correction proposal.
///
/// Deliberately narrow: customer invoices only, an actual posting must
/// exist, nothing may point at a value-level error (wrong total or VAT),
/// and at least one correctable structural issue must be present.
pub fn correction_eligible(trace: &InvoicePostingTrace) -> bool {
    let has = |code: IssueCode| trace.issues.iter().any(|i| i.code == code);

    trace.invoice.kind == InvoiceKind::Customer
        && !trace.actual.rows.is_empty()
        && !has(IssueCode::TotalMismatch)
        && !has(IssueCode::VatMismatch)
        && (has(IssueCode::RowAccountConsistency)
            || has(IssueCode::ControlAccountMissing)
            || has(IssueCode::UnbalancedPosting))
}

/// The actual row a correction should move.
///
/// Prefers a non-control row whose account the expected posting never
/// mentions (the misposted row); falls back to the first non-control row.
pub fn default_correction_row<'a>(
    trace: &'a InvoicePostingTrace,
    config: &VerifyConfig,
) -> Option<&'a PostingRow> {
    let kind = trace.invoice.kind;
    let non_control = |row: &&PostingRow| !config.control_accounts.is_control(kind, &row.account);
    let expected_accounts: Vec<&str> = trace
        .expected
        .rows
        .iter()
        .map(|r| r.account.as_str())
        .collect();

    trace
        .actual
        .rows
        .iter()
        .filter(non_control)
        .find(|row| !expected_accounts.contains(&row.account.as_str()))
        .or_else(|| trace.actual.rows.iter().find(non_control))
}

/// Account a moved amount should land on: the first expected account the
/// actual posting lacks, else the control account for the invoice type.
fn default_target_account(trace: &InvoicePostingTrace, config: &VerifyConfig) -> Option<String> {
    let actual_accounts: Vec<&str> = trace
        .actual
        .rows
        .iter()
        .map(|r| r.account.as_str())
        .collect();

    trace
        .expected
        .rows
        .iter()
        .map(|r| r.account.as_str())
        .find(|a| !actual_accounts.contains(a))
        .or_else(|| config.control_accounts.for_kind(trace.invoice.kind).next())
        .map(String::from)
}

/// Build a prefilled correction form for an eligible trace.
///
/// Returns `None` when the eligibility rules (see [`correction_eligible`])
/// do not hold, or no sensible row/target pair exists. The form is still
/// user-editable; nothing is submitted until it validates.
pub fn propose_correction(
    trace: &InvoicePostingTrace,
    config: &VerifyConfig,
    transaction_date: NaiveDate,
) -> Option<CorrectionForm> {
    if !correction_eligible(trace) {
        return None;
    }

    let row = default_correction_row(trace, config)?;
    let to_account = default_target_account(trace, config)?;
    if to_account == row.account {
        return None;
    }

    let side = if row.debit > row.credit {
        CorrectionSide::Debit
    } else {
        CorrectionSide::Credit
    };

    Some(CorrectionForm {
        invoice_kind: trace.invoice.kind,
        invoice_id: trace.invoice.id.clone(),
        side,
        from_account: row.account.clone(),
        to_account,
        amount: row.amount().to_string(),
        voucher_series: "A".into(),
        transaction_date: transaction_date.format("%Y-%m-%d").to_string(),
        reason: format!(
            "Rättelse av kontering för {} {}",
            trace.invoice.kind.label(),
            trace.invoice.number
        ),
    })
}
