//! Invariant checks and issue classification for posting traces.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::accounts::is_vat_account;
use crate::core::{ControlAccounts, PostingRow};

use super::trace::{
    ActualPosting, ActualPostingStatus, ExpectedPosting, InvoicePostingTrace, IssueCode,
    PostingChecks, PostingIssue, PostingTotals, TraceInput, TracedInvoice, VoucherMatchPath,
};

/// Verifier configuration: rounding tolerance and the control-account
/// sets, which vary per chart of accounts and company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Allowed rounding difference in balance and total comparisons.
    pub epsilon: Decimal,
    pub control_accounts: ControlAccounts,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            epsilon: dec!(0.01),
            control_accounts: ControlAccounts::default(),
        }
    }
}

/// Assemble and verify a trace from raw ledger material.
///
/// Computes totals for both postings, runs the five checks, and produces
/// the severity-ordered issue list.
pub fn assemble_trace(input: TraceInput, config: &VerifyConfig) -> InvoicePostingTrace {
    let expected = ExpectedPosting {
        totals: PostingTotals::from_rows(&input.expected_rows, config.epsilon),
        rows: input.expected_rows,
    };
    let actual = ActualPosting {
        status: input.status,
        source: input.source,
        match_path: input.match_path,
        confidence: input.resolution_confidence,
        voucher: input.voucher,
        totals: PostingTotals::from_rows(&input.actual_rows, config.epsilon),
        rows: input.actual_rows,
    };

    let checks = run_checks(&input.invoice, &expected, &actual, config);
    let issues = collect_issues(&input.invoice, &expected, &actual, &checks, config);

    InvoicePostingTrace {
        invoice: input.invoice,
        expected,
        actual,
        checks,
        issues,
    }
}

/// The rows the value checks run against: the actual posting when one was
/// resolved, else the expected posting.
fn effective<'a>(expected: &'a ExpectedPosting, actual: &'a ActualPosting) -> &'a [PostingRow] {
    if actual.rows.is_empty() {
        &expected.rows
    } else {
        &actual.rows
    }
}

/// Run the five invariant checks over a trace.
pub fn run_checks(
    invoice: &TracedInvoice,
    expected: &ExpectedPosting,
    actual: &ActualPosting,
    config: &VerifyConfig,
) -> PostingChecks {
    let rows = effective(expected, actual);
    let totals = PostingTotals::from_rows(rows, config.epsilon);

    let balanced = totals.balanced;
    let total_match = (totals.amount() - invoice.total).abs() <= config.epsilon;

    let vat_match = match invoice.vat_total {
        Some(invoice_vat) => {
            let posted_vat: Decimal = rows
                .iter()
                .filter(|r| is_vat_account(&r.account))
                .map(|r| r.amount())
                .sum();
            (posted_vat - invoice_vat).abs() <= config.epsilon
        }
        // Nothing to tie against — the check cannot fail.
        None => true,
    };

    let control_account_present = rows
        .iter()
        .any(|r| config.control_accounts.is_control(invoice.kind, &r.account));

    let row_account_consistency = offending_accounts(invoice, expected, actual, config).is_empty();

    PostingChecks {
        balanced,
        total_match,
        vat_match,
        control_account_present,
        row_account_consistency,
    }
}

/// Non-control accounts used by the actual posting that the expected
/// posting never mentions. Empty when no actual rows exist.
fn offending_accounts(
    invoice: &TracedInvoice,
    expected: &ExpectedPosting,
    actual: &ActualPosting,
    config: &VerifyConfig,
) -> Vec<String> {
    let expected_accounts: Vec<&str> = expected.rows.iter().map(|r| r.account.as_str()).collect();
    let mut offending = Vec::new();
    for row in &actual.rows {
        if config.control_accounts.is_control(invoice.kind, &row.account) {
            continue;
        }
        if expected_accounts.contains(&row.account.as_str()) {
            continue;
        }
        if !offending.contains(&row.account) {
            offending.push(row.account.clone());
        }
    }
    offending
}

/// Classify failed checks and resolution weaknesses into ordered issues.
pub fn collect_issues(
    invoice: &TracedInvoice,
    expected: &ExpectedPosting,
    actual: &ActualPosting,
    checks: &PostingChecks,
    config: &VerifyConfig,
) -> Vec<PostingIssue> {
    let mut issues = Vec::new();
    let has_actual = !actual.rows.is_empty();

    if actual.status == ActualPostingStatus::Unavailable || !has_actual {
        issues.push(
            PostingIssue::new(
                IssueCode::ActualPostingUnavailable,
                format!(
                    "bokföringen för {} {} kunde inte hämtas",
                    invoice.kind.label(),
                    invoice.number
                ),
            )
            .suggest("kontrollera fakturan manuellt i bokföringssystemet"),
        );
    }

    if actual.voucher.is_none() && actual.match_path == VoucherMatchPath::None {
        issues.push(
            PostingIssue::new(
                IssueCode::VoucherLinkMissing,
                format!("fakturan {} saknar kopplat verifikat", invoice.number),
            )
            .suggest("koppla verifikatet till fakturan i bokföringssystemet"),
        );
    }

    if actual.match_path == VoucherMatchPath::Heuristic {
        issues.push(
            PostingIssue::new(
                IssueCode::HeuristicMatchUncertain,
                "verifikatet hittades heuristiskt på belopp och datum".to_string(),
            )
            .suggest("bekräfta att rätt verifikat granskas innan åtgärd"),
        );
    }

    // Value checks only say something about a posting that exists; the
    // info issue above covers the unresolved state.
    if has_actual {
        if !checks.balanced {
            issues.push(
                PostingIssue::new(
                    IssueCode::UnbalancedPosting,
                    format!(
                        "verifikatet balanserar inte: debet {} ≠ kredit {}",
                        actual.totals.debit, actual.totals.credit
                    ),
                )
                .suggest("komplettera verifikatet så att debet och kredit stämmer"),
            );
        }

        if !checks.total_match {
            issues.push(
                PostingIssue::new(
                    IssueCode::TotalMismatch,
                    format!(
                        "bokfört belopp {} stämmer inte med fakturans totalbelopp {}",
                        actual.totals.amount(),
                        invoice.total
                    ),
                )
                .suggest("jämför verifikatet mot fakturan rad för rad"),
            );
        }

        if !checks.vat_match {
            issues.push(
                PostingIssue::new(
                    IssueCode::VatMismatch,
                    "bokförd moms stämmer inte med fakturans moms".to_string(),
                )
                .suggest("kontrollera momskonton och momssats på fakturan"),
            );
        }

        if !checks.control_account_present {
            let wanted: Vec<&str> = config.control_accounts.for_kind(invoice.kind).collect();
            issues.push(
                PostingIssue::new(
                    IssueCode::ControlAccountMissing,
                    format!(
                        "inget motkonto ({}) finns i verifikatet",
                        wanted.join(", ")
                    ),
                )
                .suggest("en rättelse kan flytta beloppet till rätt motkonto"),
            );
        }

        let offending = offending_accounts(invoice, expected, actual, config);
        if !offending.is_empty() {
            issues.push(
                PostingIssue::new(
                    IssueCode::RowAccountConsistency,
                    format!(
                        "konto {} används i verifikatet men inte i den förväntade konteringen",
                        offending.join(", ")
                    ),
                )
                .suggest("en rättelse kan flytta beloppet till ett förväntat konto"),
            );
        }
    }

    // Critical first, info last; stable within each severity.
    issues.sort_by_key(|i| std::cmp::Reverse(i.severity));
    issues
}
