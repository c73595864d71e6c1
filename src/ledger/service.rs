//! Orchestration: fetch snapshots, score batches, cache traces, and keep
//! approve/dismiss/submit idempotent.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{
    BankTransaction, InvoiceKind, KonteraError, MatchResult, ValidationError, VoucherRef,
};
use crate::correction::{CorrectionForm, validate_correction};
use crate::matching::{build_payment_registration, propose_match};
use crate::posting::{InvoicePostingTrace, VerifyConfig, assemble_trace};

use super::cache::{TraceCache, TraceKey};
use super::provider::{LedgerProvider, ProviderError};

/// Service-level failure: either the provider misbehaved or the caller's
/// input did not validate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Domain(#[from] KonteraError),

    #[error("validation failed: {0}")]
    Validation(ValidationError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl ServiceError {
    /// Stable Swedish message for the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(err) => err.user_message(),
            Self::Domain(err) => err.to_string(),
            Self::Validation(err) => err.message.clone(),
        }
    }
}

/// Outcome of an approval: registered now, or already registered earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproveOutcome {
    Registered,
    AlreadyRegistered,
}

/// Mutable service state. The lock is never held across an await point.
struct ServiceState {
    cache: TraceCache,
    /// Bumped by [`ReconciliationService::invalidate_inflight`]; responses
    /// fetched under an older generation are discarded, not applied.
    generation: u64,
    approved: HashSet<String>,
    dismissed: HashSet<String>,
    corrections: HashMap<(InvoiceKind, String), VoucherRef>,
}

/// The reconciliation service: owns the trace cache, the idempotency
/// bookkeeping, and the generation token for stale-response discard.
///
/// I/O is single-threaded async against the provider; scoring and
/// verification are pure and synchronous, run against one fetched
/// snapshot at a time.
pub struct ReconciliationService<P> {
    provider: P,
    company: String,
    config: VerifyConfig,
    state: Mutex<ServiceState>,
}

impl<P: LedgerProvider> ReconciliationService<P> {
    pub fn new(provider: P, company: impl Into<String>) -> Self {
        Self {
            provider,
            company: company.into(),
            config: VerifyConfig::default(),
            state: Mutex::new(ServiceState {
                cache: TraceCache::with_defaults(),
                generation: 0,
                approved: HashSet::new(),
                dismissed: HashSet::new(),
                corrections: HashMap::new(),
            }),
        }
    }

    /// Replace the verifier configuration (epsilon, control accounts).
    pub fn with_config(mut self, config: VerifyConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the trace cache (custom TTL, capacity, or clock).
    pub fn with_cache(self, cache: TraceCache) -> Self {
        self.state.lock().expect("service state poisoned").cache = cache;
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ServiceState> {
        self.state.lock().expect("service state poisoned")
    }

    /// Match a batch of bank transactions against one snapshot of open
    /// invoices.
    ///
    /// Dismissed transactions are hidden from the result. If one candidate
    /// pool fails to fetch, transactions needing that pool get the fetch
    /// failure as their note and the rest still match; both pools failing
    /// surfaces the error.
    pub async fn match_transactions(
        &self,
        transactions: &[BankTransaction],
    ) -> Result<Vec<MatchResult>, ServiceError> {
        let suppliers = self.provider.supplier_invoices().await;
        let customers = self.provider.customer_invoices().await;

        if let (Err(supplier_err), Err(_)) = (&suppliers, &customers) {
            warn!("båda fakturalistorna kunde inte hämtas");
            return Err(ServiceError::Provider(supplier_err.clone()));
        }

        let dismissed = self.state().dismissed.clone();
        let results = transactions
            .iter()
            .filter(|tx| !dismissed.contains(&tx.id))
            .map(|tx| {
                let pool = if tx.amount.is_sign_negative() {
                    &suppliers
                } else {
                    &customers
                };
                match pool {
                    // Zero-amount rows never consult a pool; the engine
                    // gives them their own note.
                    _ if tx.amount.is_zero() => propose_match(tx, &[], &[]),
                    Ok(_) => propose_match(
                        tx,
                        suppliers.as_deref().unwrap_or(&[]),
                        customers.as_deref().unwrap_or(&[]),
                    ),
                    Err(err) => MatchResult {
                        transaction: tx.clone(),
                        matched: None,
                        confidence: None,
                        note: Some(err.user_message()),
                    },
                }
            })
            .collect::<Vec<_>>();

        debug!(count = results.len(), "matchade banktransaktioner");
        Ok(results)
    }

    /// Fetch (or reuse) the verified posting trace for one invoice.
    ///
    /// Traces are cached per (company, kind, invoice) with a fixed TTL;
    /// `force_refresh` bypasses and overwrites the cache. Returns
    /// `Ok(None)` when the response belongs to a superseded generation —
    /// the fetch was not cancelled, its result is simply not applied.
    pub async fn posting_trace(
        &self,
        kind: InvoiceKind,
        invoice_id: &str,
        force_refresh: bool,
    ) -> Result<Option<InvoicePostingTrace>, ServiceError> {
        let key = TraceKey {
            company: self.company.clone(),
            kind,
            invoice_id: invoice_id.to_string(),
        };

        let generation = {
            let state = self.state();
            if !force_refresh {
                if let Some(trace) = state.cache.get(&key) {
                    debug!(invoice = invoice_id, "spår från cache");
                    return Ok(Some(trace.clone()));
                }
            }
            state.generation
        };

        let input = self.provider.posting_trace(kind, invoice_id).await?;

        let mut state = self.state();
        if generation != state.generation {
            debug!(invoice = invoice_id, "förlegat svar kasseras");
            return Ok(None);
        }

        let trace = assemble_trace(input, &self.config);
        state.cache.insert(key, trace.clone());
        Ok(Some(trace))
    }

    /// Mark every in-flight fetch as superseded. Called when the user
    /// abandons the view a fetch was started for.
    pub fn invalidate_inflight(&self) {
        self.state().generation += 1;
    }

    /// Approve a proposed match: register the payment in the ledger.
    ///
    /// Idempotent — approving the same transaction again after success is
    /// a no-op, never a duplicate payment. A failed registration leaves
    /// the transaction unapproved so the caller may retry.
    pub async fn approve_match(
        &self,
        result: &MatchResult,
    ) -> Result<ApproveOutcome, ServiceError> {
        let tx_id = result.transaction.id.clone();
        if self.state().approved.contains(&tx_id) {
            debug!(transaction = %tx_id, "redan godkänd – hoppar över");
            return Ok(ApproveOutcome::AlreadyRegistered);
        }

        let registration = build_payment_registration(result)?;
        match registration.invoice_kind {
            InvoiceKind::Supplier => {
                self.provider.register_supplier_payment(&registration).await?
            }
            InvoiceKind::Customer => {
                self.provider.register_customer_payment(&registration).await?
            }
        }

        self.state().approved.insert(tx_id);
        Ok(ApproveOutcome::Registered)
    }

    /// Hide a transaction from further match results. Idempotent; the
    /// transaction itself is never mutated.
    pub fn dismiss(&self, transaction_id: &str) {
        self.state().dismissed.insert(transaction_id.to_string());
    }

    pub fn is_dismissed(&self, transaction_id: &str) -> bool {
        self.state().dismissed.contains(transaction_id)
    }

    /// Validate and submit a correction voucher.
    ///
    /// Idempotent per invoice — a repeated submit after success returns
    /// the voucher created the first time instead of booking a duplicate.
    pub async fn submit_correction(
        &self,
        form: &CorrectionForm,
    ) -> Result<VoucherRef, ServiceError> {
        let proposal = validate_correction(form)?;
        let key = (proposal.invoice_kind, proposal.invoice_id.clone());

        {
            let state = self.state();
            if let Some(existing) = state.corrections.get(&key) {
                debug!(invoice = %key.1, "rättelse redan inskickad");
                return Ok(existing.clone());
            }
        }

        let voucher = self.provider.submit_correction(&proposal).await?;
        debug!(voucher = %voucher, "rättelseverifikat skapat");
        self.state().corrections.insert(key, voucher.clone());
        Ok(voucher)
    }
}
