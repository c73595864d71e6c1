#![cfg(feature = "ledger")]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use kontera::core::{
    BankTransaction, CorrectionProposal, CorrectionSide, InvoiceCandidate, InvoiceKind,
    PostingRow, VoucherRef,
};
use kontera::correction::CorrectionForm;
use kontera::ledger::*;
use kontera::matching::PaymentRegistration;
use kontera::posting::{ActualPostingStatus, TraceInput, TracedInvoice, VoucherMatchPath};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Default)]
struct MockState {
    supplier_calls: usize,
    customer_calls: usize,
    trace_calls: usize,
    suppliers: Vec<InvoiceCandidate>,
    customers: Vec<InvoiceCandidate>,
    fail_suppliers: Option<ProviderError>,
    fail_customers: Option<ProviderError>,
    fail_next_payment: bool,
    payments: Vec<PaymentRegistration>,
    corrections: Vec<CorrectionProposal>,
    hold_trace: bool,
    release_trace: bool,
}

#[derive(Clone)]
struct MockProvider(Arc<Mutex<MockState>>);

impl MockProvider {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(MockState::default())))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.0.lock().unwrap()
    }
}

fn customer_trace_input(invoice_id: &str) -> TraceInput {
    TraceInput {
        invoice: TracedInvoice {
            kind: InvoiceKind::Customer,
            id: invoice_id.into(),
            number: invoice_id.into(),
            counterparty_name: "Kund AB".into(),
            total: dec!(1250),
            vat_total: Some(dec!(250)),
        },
        expected_rows: vec![
            PostingRow::debit("1510", dec!(1250), ""),
            PostingRow::credit("2611", dec!(250), ""),
            PostingRow::credit("3010", dec!(1000), ""),
        ],
        actual_rows: vec![
            PostingRow::debit("1510", dec!(1250), ""),
            PostingRow::credit("2611", dec!(250), ""),
            PostingRow::credit("3010", dec!(1000), ""),
        ],
        status: ActualPostingStatus::Resolved,
        source: "mock:voucher".into(),
        match_path: VoucherMatchPath::ExplicitSingle,
        resolution_confidence: None,
        voucher: Some(VoucherRef {
            series: "A".into(),
            number: 41,
            year: Some(2026),
        }),
    }
}

#[async_trait]
impl LedgerProvider for MockProvider {
    async fn supplier_invoices(&self) -> Result<Vec<InvoiceCandidate>, ProviderError> {
        let mut state = self.state();
        state.supplier_calls += 1;
        match &state.fail_suppliers {
            Some(err) => Err(err.clone()),
            None => Ok(state.suppliers.clone()),
        }
    }

    async fn customer_invoices(&self) -> Result<Vec<InvoiceCandidate>, ProviderError> {
        let mut state = self.state();
        state.customer_calls += 1;
        match &state.fail_customers {
            Some(err) => Err(err.clone()),
            None => Ok(state.customers.clone()),
        }
    }

    async fn posting_trace(
        &self,
        _kind: InvoiceKind,
        invoice_id: &str,
    ) -> Result<TraceInput, ProviderError> {
        self.state().trace_calls += 1;
        loop {
            {
                let state = self.state();
                if !state.hold_trace || state.release_trace {
                    break;
                }
            }
            tokio::task::yield_now().await;
        }
        Ok(customer_trace_input(invoice_id))
    }

    async fn register_supplier_payment(
        &self,
        registration: &PaymentRegistration,
    ) -> Result<(), ProviderError> {
        let mut state = self.state();
        if state.fail_next_payment {
            state.fail_next_payment = false;
            return Err(ProviderError::Network("avbruten anslutning".into()));
        }
        state.payments.push(registration.clone());
        Ok(())
    }

    async fn register_customer_payment(
        &self,
        registration: &PaymentRegistration,
    ) -> Result<(), ProviderError> {
        self.register_supplier_payment(registration).await
    }

    async fn submit_correction(
        &self,
        proposal: &CorrectionProposal,
    ) -> Result<VoucherRef, ProviderError> {
        let mut state = self.state();
        state.corrections.push(proposal.clone());
        Ok(VoucherRef {
            series: proposal.voucher_series.clone(),
            number: state.corrections.len() as i64,
            year: Some(2026),
        })
    }
}

fn outgoing_tx(id: &str, amount: rust_decimal::Decimal, description: &str) -> BankTransaction {
    BankTransaction::new(id, date(2026, 1, 10), amount, description)
}

fn telia_invoice() -> InvoiceCandidate {
    InvoiceCandidate::new(
        InvoiceKind::Supplier,
        "100",
        "Telia Sverige AB",
        dec!(625.00),
    )
    .ocr("1234566")
}

fn correction_form() -> CorrectionForm {
    CorrectionForm {
        invoice_kind: InvoiceKind::Customer,
        invoice_id: "42".into(),
        side: CorrectionSide::Credit,
        from_account: "3040".into(),
        to_account: "3010".into(),
        amount: "1000".into(),
        voucher_series: "A".into(),
        transaction_date: "2026-01-15".into(),
        reason: "Rättelse av kontering".into(),
    }
}

#[tokio::test]
async fn batch_matches_against_one_snapshot() {
    let provider = MockProvider::new();
    provider.state().suppliers = vec![telia_invoice()];
    let service = ReconciliationService::new(provider.clone(), "acme");

    let txs = vec![
        outgoing_tx("tx-1", dec!(-625.00), "Telia faktura 100 OCR 1234566"),
        outgoing_tx("tx-2", dec!(-99.00), "Okänd"),
    ];
    let results = service.match_transactions(&txs).await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].matched.is_some());
    assert!(results[1].matched.is_none());
    // One snapshot per pool, regardless of batch size.
    assert_eq!(provider.state().supplier_calls, 1);
    assert_eq!(provider.state().customer_calls, 1);
}

#[tokio::test]
async fn dismissed_transactions_are_hidden() {
    let provider = MockProvider::new();
    let service = ReconciliationService::new(provider, "acme");

    service.dismiss("tx-1");
    service.dismiss("tx-1");
    assert!(service.is_dismissed("tx-1"));

    let txs = vec![
        outgoing_tx("tx-1", dec!(-625.00), "Telia"),
        outgoing_tx("tx-2", dec!(-99.00), "Okänd"),
    ];
    let results = service.match_transactions(&txs).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].transaction.id, "tx-2");
}

#[tokio::test]
async fn one_failed_pool_degrades_gracefully() {
    let provider = MockProvider::new();
    {
        let mut state = provider.state();
        state.fail_suppliers = Some(ProviderError::Network("timeout".into()));
        state.customers = vec![InvoiceCandidate::new(
            InvoiceKind::Customer,
            "200",
            "Kund AB",
            dec!(500.00),
        )];
    }
    let service = ReconciliationService::new(provider, "acme");

    let txs = vec![
        outgoing_tx("tx-1", dec!(-625.00), "Telia"),
        outgoing_tx("tx-2", dec!(500.00), "Inbetalning 200"),
    ];
    let results = service.match_transactions(&txs).await.unwrap();

    // The supplier-side transaction carries the fetch failure as a note.
    assert!(results[0].matched.is_none());
    assert!(results[0].note.as_deref().unwrap().contains("kunde inte nås"));
    // The customer-side transaction still matched.
    assert!(results[1].matched.is_some());
}

#[tokio::test]
async fn both_pools_failing_is_an_error() {
    let provider = MockProvider::new();
    {
        let mut state = provider.state();
        state.fail_suppliers = Some(ProviderError::Network("timeout".into()));
        state.fail_customers = Some(ProviderError::Network("timeout".into()));
    }
    let service = ReconciliationService::new(provider, "acme");
    let txs = vec![outgoing_tx("tx-1", dec!(-625.00), "Telia")];
    assert!(service.match_transactions(&txs).await.is_err());
}

#[tokio::test]
async fn permission_errors_map_to_the_fixed_message() {
    let provider = MockProvider::new();
    {
        let mut state = provider.state();
        let forbidden = ProviderError::Http {
            status: 403,
            code: None,
            message: "You are not allowed to read vouchers for this tenant".into(),
        };
        state.fail_suppliers = Some(forbidden.clone());
        state.fail_customers = Some(forbidden);
    }
    let service = ReconciliationService::new(provider, "acme");
    let err = service
        .match_transactions(&[outgoing_tx("tx-1", dec!(-625.00), "Telia")])
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), PERMISSION_DENIED_MESSAGE);
}

/// Manually advanced clock shared with the service's cache.
struct TestClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl TestClock {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }
}

#[tokio::test]
async fn traces_are_cached_within_ttl() {
    let provider = MockProvider::new();
    let clock = Arc::new(TestClock::new());
    let cache = TraceCache::new(DEFAULT_TRACE_TTL, 8, clock.clone());
    let service = ReconciliationService::new(provider.clone(), "acme").with_cache(cache);

    let first = service
        .posting_trace(InvoiceKind::Customer, "42", false)
        .await
        .unwrap()
        .unwrap();
    assert!(first.checks.balanced);
    assert_eq!(provider.state().trace_calls, 1);

    // Within TTL: served from cache.
    service
        .posting_trace(InvoiceKind::Customer, "42", false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(provider.state().trace_calls, 1);

    // After TTL: fetched again.
    clock.advance(DEFAULT_TRACE_TTL + Duration::from_secs(1));
    service
        .posting_trace(InvoiceKind::Customer, "42", false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(provider.state().trace_calls, 2);
}

#[tokio::test]
async fn force_refresh_bypasses_the_cache() {
    let provider = MockProvider::new();
    let service = ReconciliationService::new(provider.clone(), "acme");

    service
        .posting_trace(InvoiceKind::Customer, "42", false)
        .await
        .unwrap();
    service
        .posting_trace(InvoiceKind::Customer, "42", true)
        .await
        .unwrap();
    assert_eq!(provider.state().trace_calls, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn superseded_fetch_is_discarded() {
    let provider = MockProvider::new();
    provider.state().hold_trace = true;
    let service = Arc::new(ReconciliationService::new(provider.clone(), "acme"));

    let svc = service.clone();
    let fetch = tokio::spawn(async move {
        svc.posting_trace(InvoiceKind::Customer, "42", false).await
    });

    // Wait until the fetch is in flight, then abandon the view.
    while provider.state().trace_calls == 0 {
        tokio::task::yield_now().await;
    }
    service.invalidate_inflight();
    provider.state().release_trace = true;

    let result = fetch.await.unwrap().unwrap();
    assert!(result.is_none(), "stale response must be discarded");

    // The discarded response was not cached: a new call fetches again.
    provider.state().hold_trace = false;
    let trace = service
        .posting_trace(InvoiceKind::Customer, "42", false)
        .await
        .unwrap();
    assert!(trace.is_some());
    assert_eq!(provider.state().trace_calls, 2);
}

#[tokio::test]
async fn approve_is_idempotent_after_success() {
    let provider = MockProvider::new();
    provider.state().suppliers = vec![telia_invoice()];
    let service = ReconciliationService::new(provider.clone(), "acme");

    let txs = vec![outgoing_tx("tx-1", dec!(-625.00), "Telia faktura 100 OCR 1234566")];
    let results = service.match_transactions(&txs).await.unwrap();

    let first = service.approve_match(&results[0]).await.unwrap();
    assert_eq!(first, ApproveOutcome::Registered);

    let second = service.approve_match(&results[0]).await.unwrap();
    assert_eq!(second, ApproveOutcome::AlreadyRegistered);

    let state = provider.state();
    assert_eq!(state.payments.len(), 1);
    assert_eq!(state.payments[0].invoice_number, "100");
    assert_eq!(state.payments[0].amount, dec!(625.00));
}

#[tokio::test]
async fn failed_approval_can_be_retried() {
    let provider = MockProvider::new();
    {
        let mut state = provider.state();
        state.suppliers = vec![telia_invoice()];
        state.fail_next_payment = true;
    }
    let service = ReconciliationService::new(provider.clone(), "acme");

    let txs = vec![outgoing_tx("tx-1", dec!(-625.00), "Telia faktura 100 OCR 1234566")];
    let results = service.match_transactions(&txs).await.unwrap();

    assert!(service.approve_match(&results[0]).await.is_err());

    // Retry without re-deriving the match.
    let retried = service.approve_match(&results[0]).await.unwrap();
    assert_eq!(retried, ApproveOutcome::Registered);
    assert_eq!(provider.state().payments.len(), 1);
}

#[tokio::test]
async fn correction_submission_is_idempotent() {
    let provider = MockProvider::new();
    let service = ReconciliationService::new(provider.clone(), "acme");

    let first = service.submit_correction(&correction_form()).await.unwrap();
    let second = service.submit_correction(&correction_form()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.state().corrections.len(), 1);
    assert_eq!(provider.state().corrections[0].amount, dec!(1000.00));
}

struct NoSession;

#[async_trait]
impl CredentialSource for NoSession {
    async fn bearer_token(&self) -> Result<String, ProviderError> {
        Err(ProviderError::NotAuthenticated)
    }
}

#[tokio::test]
async fn missing_credentials_are_a_recoverable_condition() {
    let err = NoSession.bearer_token().await.unwrap_err();
    assert_eq!(err.user_message(), NOT_AUTHENTICATED_MESSAGE);
}

#[tokio::test]
async fn invalid_correction_never_reaches_the_provider() {
    let provider = MockProvider::new();
    let service = ReconciliationService::new(provider.clone(), "acme");

    let mut form = correction_form();
    form.from_account = "99999".into();
    let err = service.submit_correction(&form).await.unwrap_err();
    assert!(err.user_message().contains("BAS-konto"));
    assert!(provider.state().corrections.is_empty());
}
