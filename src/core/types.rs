use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A canonical bank transaction built from one CSV row.
///
/// Immutable once built. The sign of `amount` carries the direction:
/// negative for outgoing money (supplier payments), positive for incoming
/// (customer payments). Zero-amount transactions are kept for display but
/// excluded from matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Stable row identifier within one import (`tx-1`, `tx-2`, …).
    pub id: String,
    /// Booking date.
    pub date: NaiveDate,
    /// Signed amount in the account currency.
    pub amount: Decimal,
    /// Transaction text as exported by the bank.
    pub description: String,
    /// ISO 4217 currency code, when the export carries one.
    pub currency: Option<String>,
    /// Counterparty name (payer/payee), when the export carries one.
    pub counterparty: Option<String>,
    /// Free-form bank reference.
    pub reference: Option<String>,
    /// OCR payment reference, when exported as its own column.
    pub ocr: Option<String>,
    /// Own account number, when the export carries one.
    pub account: Option<String>,
    /// The original row, keyed by header. Kept for audit provenance.
    pub raw: BTreeMap<String, String>,
}

impl BankTransaction {
    /// Create a transaction with the mandatory fields set.
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            amount,
            description: description.into(),
            currency: None,
            counterparty: None,
            reference: None,
            ocr: None,
            account: None,
            raw: BTreeMap::new(),
        }
    }

    pub fn counterparty(mut self, name: impl Into<String>) -> Self {
        self.counterparty = Some(name.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn ocr(mut self, ocr: impl Into<String>) -> Self {
        self.ocr = Some(ocr.into());
        self
    }
}

/// Which side of the ledger an invoice lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceKind {
    /// Leverantörsfaktura — money we owe.
    Supplier,
    /// Kundfaktura — money owed to us.
    Customer,
}

impl InvoiceKind {
    /// Swedish label used in notes and messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Supplier => "leverantörsfaktura",
            Self::Customer => "kundfaktura",
        }
    }
}

/// An open invoice fetched from the ledger, as seen by the matching engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCandidate {
    pub kind: InvoiceKind,
    /// Invoice number in the ledger (e.g. "100", "F2026-014").
    pub number: String,
    /// Ledger id of the counterparty (customer/supplier number).
    pub counterparty_id: Option<String>,
    /// Counterparty display name.
    pub counterparty_name: String,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Invoice gross total.
    pub total: Decimal,
    /// Remaining open balance; `None` when the ledger does not expose one.
    pub balance: Option<Decimal>,
    /// Whether the invoice is already booked (supplier side).
    pub booked: bool,
    /// Whether the invoice is cancelled (customer side).
    pub cancelled: bool,
    /// OCR payment reference printed on the invoice.
    pub ocr: Option<String>,
}

impl InvoiceCandidate {
    pub fn new(
        kind: InvoiceKind,
        number: impl Into<String>,
        counterparty_name: impl Into<String>,
        total: Decimal,
    ) -> Self {
        Self {
            kind,
            number: number.into(),
            counterparty_id: None,
            counterparty_name: counterparty_name.into(),
            due_date: None,
            total,
            balance: None,
            booked: false,
            cancelled: false,
            ocr: None,
        }
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn ocr(mut self, ocr: impl Into<String>) -> Self {
        self.ocr = Some(ocr.into());
        self
    }

    pub fn booked(mut self, booked: bool) -> Self {
        self.booked = booked;
        self
    }

    pub fn cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// The amount still payable: balance when the ledger exposes one,
    /// otherwise the invoice total.
    pub fn open_amount(&self) -> Decimal {
        self.balance.unwrap_or(self.total)
    }

    /// Whether this invoice can take a payment at all.
    pub fn is_open(&self) -> bool {
        let settled = self.open_amount() <= Decimal::ZERO;
        match self.kind {
            InvoiceKind::Supplier => !settled && !self.booked && !self.cancelled,
            InvoiceKind::Customer => !settled && !self.cancelled,
        }
    }
}

/// Confidence tier of a proposed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Swedish label shown to the user ("Hög", "Medel", "Låg").
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "Hög",
            Self::Medium => "Medel",
            Self::Low => "Låg",
        }
    }
}

/// The invoice a transaction was matched to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceMatch {
    pub kind: InvoiceKind,
    pub invoice: InvoiceCandidate,
}

/// Outcome of matching one bank transaction.
///
/// `confidence` is present iff `matched` is present. `note` explains the
/// match (contributing signals) or the absence of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub transaction: BankTransaction,
    pub matched: Option<InvoiceMatch>,
    pub confidence: Option<Confidence>,
    pub note: Option<String>,
}

/// One row of a double-entry posting.
///
/// `account` is a 4-digit BAS code. Exactly one of `debit`/`credit` is
/// non-zero on a well-formed row; both are ≥ 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingRow {
    pub account: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub description: String,
}

impl PostingRow {
    pub fn debit(account: impl Into<String>, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            debit: amount,
            credit: Decimal::ZERO,
            description: description.into(),
        }
    }

    pub fn credit(account: impl Into<String>, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            debit: Decimal::ZERO,
            credit: amount,
            description: description.into(),
        }
    }

    /// The row's magnitude regardless of side.
    pub fn amount(&self) -> Decimal {
        if self.debit > Decimal::ZERO {
            self.debit
        } else {
            self.credit
        }
    }
}

/// Identity of a voucher in the ledger (series + number, optionally year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherRef {
    pub series: String,
    pub number: i64,
    pub year: Option<i32>,
}

impl std::fmt::Display for VoucherRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{}{} ({})", self.series, self.number, year),
            None => write!(f, "{}{}", self.series, self.number),
        }
    }
}

/// Which side of a posting row a correction moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionSide {
    Debit,
    Credit,
}

/// A validated correction-voucher proposal, ready for submission.
///
/// Only produced by [`crate::correction::validate_correction`] — never
/// constructed from raw user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionProposal {
    pub invoice_kind: InvoiceKind,
    pub invoice_id: String,
    pub side: CorrectionSide,
    /// Account the amount is moved away from.
    pub from_account: String,
    /// Account the amount is moved to.
    pub to_account: String,
    /// Positive amount, normalized to 2 decimals.
    pub amount: Decimal,
    /// Voucher series the correction is booked in (e.g. "A").
    pub voucher_series: String,
    pub transaction_date: NaiveDate,
    /// Why the correction is made; goes into the voucher text.
    pub reason: String,
}
