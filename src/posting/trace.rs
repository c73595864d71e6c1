//! The posting trace: one invoice's expected vs actual double entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{Confidence, InvoiceKind, PostingRow, VoucherRef};

/// How the actual posting's voucher was resolved, in falling order of
/// reliability. Consumed for reporting only — never recomputed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoucherMatchPath {
    /// The invoice links several vouchers explicitly.
    ExplicitMulti,
    /// The invoice links exactly one voucher explicitly.
    ExplicitSingle,
    /// A voucher whose text references the invoice number.
    TextReference,
    /// Amount/date heuristics only.
    Heuristic,
    /// No voucher could be resolved.
    None,
}

/// Whether the ledger could produce the actual posting at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActualPostingStatus {
    Resolved,
    Unavailable,
}

/// Debit/credit sums over a set of posting rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingTotals {
    pub debit: Decimal,
    pub credit: Decimal,
    /// Whether debit and credit agree within the verifier's epsilon.
    pub balanced: bool,
}

impl PostingTotals {
    pub fn from_rows(rows: &[PostingRow], epsilon: Decimal) -> Self {
        let debit: Decimal = rows.iter().map(|r| r.debit).sum();
        let credit: Decimal = rows.iter().map(|r| r.credit).sum();
        let balanced = (debit - credit).abs() <= epsilon;
        Self {
            debit,
            credit,
            balanced,
        }
    }

    /// The posting's magnitude: the larger of the two sides, so an
    /// unbalanced posting still compares sensibly against a total.
    pub fn amount(&self) -> Decimal {
        self.debit.max(self.credit)
    }
}

/// Invoice header carried through the trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracedInvoice {
    pub kind: InvoiceKind,
    /// Ledger id of the invoice (used as cache key and correction target).
    pub id: String,
    pub number: String,
    pub counterparty_name: String,
    /// Invoice gross total.
    pub total: Decimal,
    /// Invoice VAT total, when the ledger exposes one.
    pub vat_total: Option<Decimal>,
}

/// The posting the invoice's lines say should exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedPosting {
    pub rows: Vec<PostingRow>,
    pub totals: PostingTotals,
}

/// The posting found in the ledger, with its resolution provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualPosting {
    pub status: ActualPostingStatus,
    /// Where the rows came from (e.g. "fortnox:voucher").
    pub source: String,
    pub match_path: VoucherMatchPath,
    /// Confidence of the voucher resolution itself.
    pub confidence: Option<Confidence>,
    pub voucher: Option<VoucherRef>,
    pub rows: Vec<PostingRow>,
    pub totals: PostingTotals,
}

/// The five invariant checks run over a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingChecks {
    pub balanced: bool,
    pub total_match: bool,
    pub vat_match: bool,
    pub control_account_present: bool,
    pub row_account_consistency: bool,
}

/// Issue severity, ordered info < warning < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Closed taxonomy of posting issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueCode {
    ActualPostingUnavailable,
    VoucherLinkMissing,
    HeuristicMatchUncertain,
    UnbalancedPosting,
    TotalMismatch,
    VatMismatch,
    ControlAccountMissing,
    RowAccountConsistency,
}

impl IssueCode {
    /// Stable wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActualPostingUnavailable => "ACTUAL_POSTING_UNAVAILABLE",
            Self::VoucherLinkMissing => "VOUCHER_LINK_MISSING",
            Self::HeuristicMatchUncertain => "HEURISTIC_MATCH_UNCERTAIN",
            Self::UnbalancedPosting => "UNBALANCED_POSTING",
            Self::TotalMismatch => "TOTAL_MISMATCH",
            Self::VatMismatch => "VAT_MISMATCH",
            Self::ControlAccountMissing => "CONTROL_ACCOUNT_MISSING",
            Self::RowAccountConsistency => "ROW_ACCOUNT_CONSISTENCY",
        }
    }

    /// Severity is fixed per code.
    pub fn severity(&self) -> Severity {
        match self {
            Self::ActualPostingUnavailable => Severity::Info,
            Self::VoucherLinkMissing
            | Self::HeuristicMatchUncertain
            | Self::ControlAccountMissing
            | Self::RowAccountConsistency => Severity::Warning,
            Self::UnbalancedPosting | Self::TotalMismatch | Self::VatMismatch => Severity::Critical,
        }
    }
}

/// One classified discrepancy, with a user-facing message and suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingIssue {
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

impl PostingIssue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// The audited trace: invoice, expected posting, actual posting, check
/// results, and issues ordered by severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePostingTrace {
    pub invoice: TracedInvoice,
    pub expected: ExpectedPosting,
    pub actual: ActualPosting,
    pub checks: PostingChecks,
    pub issues: Vec<PostingIssue>,
}

/// Raw trace material as fetched from the ledger, before verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceInput {
    pub invoice: TracedInvoice,
    pub expected_rows: Vec<PostingRow>,
    pub actual_rows: Vec<PostingRow>,
    pub status: ActualPostingStatus,
    pub source: String,
    pub match_path: VoucherMatchPath,
    /// Confidence of the voucher resolution, as reported by the resolver.
    pub resolution_confidence: Option<Confidence>,
    pub voucher: Option<VoucherRef>,
}
