//! Checkout provider port for hosted payment pages.
//!
//! Each payment gateway (Paystack for cards, NOWPayments for crypto) turns a
//! checkout request into a hosted payment URL. The webhook that later
//! confirms the payment must carry the user id and plan back, so
//! implementations are responsible for attaching both to the provider-side
//! record.

use crate::domain::billing::{PaymentProviderKind, Plan};
use crate::domain::foundation::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for payment gateways that host a checkout page.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Which gateway this provider talks to.
    fn kind(&self) -> PaymentProviderKind;

    /// Create a hosted checkout for an upgrade.
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;
}

/// Request to start a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Account being upgraded.
    pub user_id: UserId,

    /// Payer email.
    pub email: String,

    /// Plan being purchased.
    pub plan: Plan,
}

/// Hosted checkout returned by a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider reference (Paystack transaction reference or NOWPayments invoice id).
    pub reference: String,

    /// URL the payer is redirected to.
    pub url: String,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// API key or secret absent from configuration.
    pub fn not_configured(what: &str) -> Self {
        Self::new(
            PaymentErrorCode::NotConfigured,
            format!("{} not configured", what),
        )
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Credentials missing from configuration.
    NotConfigured,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider rejected the request or returned an unusable response.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::NotConfigured => "not_configured",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
