//! Candidate selection: one proposed invoice match per transaction.

use rust_decimal::Decimal;

use crate::core::identity::digits_only;
use crate::core::{BankTransaction, InvoiceCandidate, InvoiceMatch, MatchResult};

use super::score::{CandidateScore, confidence_for, score_candidate};

/// Note attached to zero-amount transactions, which never match.
pub const NOTE_ZERO_AMOUNT: &str = "nollbelopp – transaktionen matchas inte";

/// Note attached when no candidate survives scoring.
pub const NOTE_NO_MATCH: &str = "ingen matchande faktura hittades";

/// Candidates eligible for a transaction, by amount sign.
///
/// Outgoing money is matched against open, unbooked supplier invoices;
/// incoming money against open, non-cancelled customer invoices.
fn candidate_pool<'a>(
    tx: &BankTransaction,
    suppliers: &'a [InvoiceCandidate],
    customers: &'a [InvoiceCandidate],
) -> &'a [InvoiceCandidate] {
    if tx.amount < Decimal::ZERO {
        suppliers
    } else {
        customers
    }
}

/// Deterministic ordering among equal top scores: earliest due date, then
/// lowest invoice number. Provider iteration order never decides a match.
fn prefer(a: &InvoiceCandidate, b: &InvoiceCandidate) -> std::cmp::Ordering {
    let due = match (a.due_date, b.due_date) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    };
    due.then_with(|| invoice_number_key(a).cmp(&invoice_number_key(b)))
}

fn invoice_number_key(invoice: &InvoiceCandidate) -> (u64, String) {
    let numeric = digits_only(&invoice.number).parse().unwrap_or(u64::MAX);
    (numeric, invoice.number.clone())
}

/// Propose at most one invoice match for a transaction.
///
/// Always returns a result: unmatched transactions carry an explanatory
/// note instead of a match. Confidence is present iff a match is.
pub fn propose_match(
    tx: &BankTransaction,
    suppliers: &[InvoiceCandidate],
    customers: &[InvoiceCandidate],
) -> MatchResult {
    if tx.amount.is_zero() {
        return MatchResult {
            transaction: tx.clone(),
            matched: None,
            confidence: None,
            note: Some(NOTE_ZERO_AMOUNT.into()),
        };
    }

    let mut best: Option<(&InvoiceCandidate, CandidateScore)> = None;
    for invoice in candidate_pool(tx, suppliers, customers) {
        if !invoice.is_open() {
            continue;
        }
        let Some(scored) = score_candidate(tx, invoice) else {
            continue;
        };
        best = match best {
            None => Some((invoice, scored)),
            Some((current, current_score)) => {
                if scored.score > current_score.score
                    || (scored.score == current_score.score
                        && prefer(invoice, current) == std::cmp::Ordering::Less)
                {
                    Some((invoice, scored))
                } else {
                    Some((current, current_score))
                }
            }
        };
    }

    match best {
        Some((invoice, scored)) => {
            let confidence = confidence_for(scored.score);
            let note = format!(
                "{} {} – {}",
                invoice.kind.label(),
                invoice.number,
                scored.signals.join(", ")
            );
            MatchResult {
                transaction: tx.clone(),
                matched: Some(InvoiceMatch {
                    kind: invoice.kind,
                    invoice: invoice.clone(),
                }),
                confidence: Some(confidence),
                note: Some(note),
            }
        }
        None => MatchResult {
            transaction: tx.clone(),
            matched: None,
            confidence: None,
            note: Some(NOTE_NO_MATCH.into()),
        },
    }
}

/// Match a whole batch against one fetched snapshot of open invoices.
pub fn match_batch(
    transactions: &[BankTransaction],
    suppliers: &[InvoiceCandidate],
    customers: &[InvoiceCandidate],
) -> Vec<MatchResult> {
    transactions
        .iter()
        .map(|tx| propose_match(tx, suppliers, customers))
        .collect()
}

/// Convenience: the Swedish confidence label for a result, if matched.
pub fn confidence_label(result: &MatchResult) -> Option<&'static str> {
    result.confidence.map(|c| c.label())
}
