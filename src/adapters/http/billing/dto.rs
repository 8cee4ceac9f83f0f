//! HTTP DTOs for billing endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::{CreateCheckoutCommand, WebhookOutcome};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of both checkout endpoints.
///
/// Fields are optional so absence is reported as a 400 with a field name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

impl From<CheckoutRequest> for CreateCheckoutCommand {
    fn from(request: CheckoutRequest) -> Self {
        Self {
            email: request.email,
            user_id: request.user_id,
            plan: request.plan,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement returned to payment providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<WebhookOutcome> for WebhookAckResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        match outcome {
            WebhookOutcome::Upgraded { .. } => Self {
                status: "ok".to_string(),
                reason: None,
            },
            WebhookOutcome::Ignored { reason } => Self {
                status: "ignored".to_string(),
                reason: Some(reason.to_string()),
            },
        }
    }
}

/// Response of `POST /api/checkout/paystack`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaystackCheckoutResponse {
    pub pay_url: String,
    pub reference: String,
}

/// Response of `POST /api/checkout/crypto`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoCheckoutResponse {
    pub pay_url: String,
    pub invoice_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
