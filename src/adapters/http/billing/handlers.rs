//! HTTP handlers for billing endpoints.
//!
//! Webhook handlers take the raw body as `Bytes`: signatures are computed
//! over the exact bytes the provider sent, so the body must not be parsed
//! before verification.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use secrecy::SecretString;

use crate::application::handlers::billing::{
    CheckoutError, CreateCheckoutHandler, HandleCryptoWebhookCommand, HandleCryptoWebhookHandler,
    HandlePaystackWebhookCommand, HandlePaystackWebhookHandler, NOWPAYMENTS_SIGNATURE_HEADER,
    PAYSTACK_SIGNATURE_HEADER,
};
use crate::domain::billing::{Plan, WebhookError};
use crate::ports::{CheckoutProvider, SubscriberAccountRepository};

use super::dto::{
    CheckoutRequest, CryptoCheckoutResponse, ErrorResponse, HealthResponse,
    PaystackCheckoutResponse, WebhookAckResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for billing routes.
///
/// Cloned per request; dependencies are `Arc`-wrapped and secrets are
/// optional so a missing secret fails the request rather than startup.
#[derive(Clone)]
pub struct BillingAppState {
    pub account_repository: Arc<dyn SubscriberAccountRepository>,
    pub paystack_checkout: Arc<dyn CheckoutProvider>,
    pub crypto_checkout: Arc<dyn CheckoutProvider>,
    pub paystack_secret_key: Option<SecretString>,
    pub nowpayments_ipn_secret: Option<SecretString>,
    pub upgrade_plan: Plan,
}

impl BillingAppState {
    pub fn paystack_webhook_handler(&self) -> HandlePaystackWebhookHandler {
        HandlePaystackWebhookHandler::new(
            self.account_repository.clone(),
            self.paystack_secret_key.clone(),
            self.upgrade_plan,
        )
    }

    pub fn crypto_webhook_handler(&self) -> HandleCryptoWebhookHandler {
        HandleCryptoWebhookHandler::new(
            self.account_repository.clone(),
            self.nowpayments_ipn_secret.clone(),
            self.upgrade_plan,
        )
    }

    pub fn paystack_checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(self.paystack_checkout.clone(), self.upgrade_plan)
    }

    pub fn crypto_checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(self.crypto_checkout.clone(), self.upgrade_plan)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhooks
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/paystack - Handle Paystack events
pub async fn handle_paystack_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let cmd = HandlePaystackWebhookCommand {
        payload: body.to_vec(),
        signature: header_value(&headers, PAYSTACK_SIGNATURE_HEADER),
    };

    let outcome = state.paystack_webhook_handler().handle(cmd).await?;

    Ok((StatusCode::OK, Json(WebhookAckResponse::from(outcome))))
}

/// POST /api/webhooks/crypto - Handle NOWPayments IPN callbacks
pub async fn handle_crypto_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let cmd = HandleCryptoWebhookCommand {
        payload: body.to_vec(),
        signature: header_value(&headers, NOWPAYMENTS_SIGNATURE_HEADER),
    };

    let outcome = state.crypto_webhook_handler().handle(cmd).await?;

    Ok((StatusCode::OK, Json(WebhookAckResponse::from(outcome))))
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout/paystack - Start a card checkout
pub async fn create_paystack_checkout(
    State(state): State<BillingAppState>,
    request: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let Json(request) = request.map_err(BillingApiError::from)?;

    let session = state
        .paystack_checkout_handler()
        .handle(request.into())
        .await?;

    Ok(Json(PaystackCheckoutResponse {
        pay_url: session.url,
        reference: session.reference,
    }))
}

/// POST /api/checkout/crypto - Start a crypto checkout
pub async fn create_crypto_checkout(
    State(state): State<BillingAppState>,
    request: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let Json(request) = request.map_err(BillingApiError::from)?;

    let session = state.crypto_checkout_handler().handle(request.into()).await?;

    Ok(Json(CryptoCheckoutResponse {
        pay_url: session.url,
        invoice_id: session.reference,
    }))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
#[derive(Debug)]
pub enum BillingApiError {
    Webhook(WebhookError),
    Checkout(CheckoutError),
    MalformedBody(String),
}

impl From<WebhookError> for BillingApiError {
    fn from(err: WebhookError) -> Self {
        Self::Webhook(err)
    }
}

impl From<CheckoutError> for BillingApiError {
    fn from(err: CheckoutError) -> Self {
        Self::Checkout(err)
    }
}

impl From<JsonRejection> for BillingApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            BillingApiError::Webhook(err) => {
                let message = match err {
                    // Store errors stay in the logs.
                    WebhookError::Database(_) => "Failed to update account".to_string(),
                    other => other.to_string(),
                };
                (err.status_code(), message)
            }
            BillingApiError::Checkout(err) => (err.status_code(), err.to_string()),
            BillingApiError::MalformedBody(reason) => (
                StatusCode::BAD_REQUEST,
                format!("Malformed request body: {}", reason),
            ),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
