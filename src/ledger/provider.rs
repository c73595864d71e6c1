//! Collaborator seams: the ledger/ERP provider and the credential source.
//!
//! The core performs no HTTP, no file I/O, and no OAuth — hosts implement
//! these traits against their ledger (Fortnox, Visma, …) and session
//! handling. Provider errors are normalized here so the rest of the crate
//! can present one stable message per failure class.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{CorrectionProposal, InvoiceCandidate, InvoiceKind, VoucherRef};
use crate::matching::PaymentRegistration;
use crate::posting::TraceInput;

/// The one user-facing message for permission failures, regardless of the
/// provider's own wording.
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Du saknar behörighet för den här åtgärden i bokföringssystemet.";

/// User-facing message for a missing/expired session.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Du är inte inloggad mot bokföringssystemet.";

/// Provider error codes that mean "permission denied" even when the HTTP
/// status says otherwise (missing license scope).
const PERMISSION_ERROR_CODES: &[u32] = &[2000663];

/// Failure talking to the ledger. Always recoverable for the host.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with an error status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        /// Provider-specific error code, when one was supplied.
        code: Option<u32>,
        message: String,
    },

    /// No valid session credential is available.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The provider answered with something unparseable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether this is a permission-class failure (HTTP 403 or a known
    /// provider permission code).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Http { status, code, .. } => {
                *status == 403 || code.is_some_and(|c| PERMISSION_ERROR_CODES.contains(&c))
            }
            _ => false,
        }
    }

    /// Stable Swedish message for the user. Permission failures collapse
    /// to [`PERMISSION_DENIED_MESSAGE`] regardless of provider wording.
    pub fn user_message(&self) -> String {
        if self.is_permission_denied() {
            return PERMISSION_DENIED_MESSAGE.to_string();
        }
        match self {
            Self::NotAuthenticated => NOT_AUTHENTICATED_MESSAGE.to_string(),
            Self::Network(_) => "Bokföringssystemet kunde inte nås. Försök igen.".to_string(),
            Self::Http { .. } | Self::InvalidResponse(_) => {
                "Uppgifterna kunde inte hämtas från bokföringssystemet.".to_string()
            }
        }
    }
}

/// The ledger/ERP collaborator.
#[async_trait]
pub trait LedgerProvider: Send + Sync {
    /// Open supplier invoices, as the ledger sees them right now.
    async fn supplier_invoices(&self) -> Result<Vec<InvoiceCandidate>, ProviderError>;

    /// Open customer invoices.
    async fn customer_invoices(&self) -> Result<Vec<InvoiceCandidate>, ProviderError>;

    /// Raw posting-trace material for one invoice: header, expected rows
    /// derived from the invoice lines, and whatever voucher resolution
    /// produced as the actual posting.
    async fn posting_trace(
        &self,
        kind: InvoiceKind,
        invoice_id: &str,
    ) -> Result<TraceInput, ProviderError>;

    /// Register a payment against a supplier invoice.
    async fn register_supplier_payment(
        &self,
        registration: &PaymentRegistration,
    ) -> Result<(), ProviderError>;

    /// Register a payment against a customer invoice.
    async fn register_customer_payment(
        &self,
        registration: &PaymentRegistration,
    ) -> Result<(), ProviderError>;

    /// Create a correction voucher from a validated proposal.
    async fn submit_correction(
        &self,
        proposal: &CorrectionProposal,
    ) -> Result<VoucherRef, ProviderError>;
}

/// The session/auth collaborator: supplies the bearer credential the
/// ledger provider needs. Implemented by the host's session handling.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// A currently valid bearer token, or [`ProviderError::NotAuthenticated`].
    async fn bearer_token(&self) -> Result<String, ProviderError>;
}
