//! Posting traces: expected vs actual double entry, with invariant checks.
//!
//! The trace material is collaborator-fed; this module computes totals,
//! runs the checks, and classifies discrepancies. It never resolves
//! vouchers itself.

mod trace;
mod verify;

pub use trace::{
    ActualPosting, ActualPostingStatus, ExpectedPosting, InvoicePostingTrace, IssueCode,
    PostingChecks, PostingIssue, PostingTotals, Severity, TraceInput, TracedInvoice,
    VoucherMatchPath,
};
pub use verify::{VerifyConfig, assemble_trace, collect_issues, run_checks};
