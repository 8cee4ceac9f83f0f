//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_crypto_checkout, create_paystack_checkout, handle_crypto_webhook,
    handle_paystack_webhook, health, BillingAppState,
};

/// Payment provider callbacks. No user auth; each request is verified by
/// signature.
///
/// # Routes
/// - `POST /paystack` - Paystack events
/// - `POST /crypto` - NOWPayments IPN
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/paystack", post(handle_paystack_webhook))
        .route("/crypto", post(handle_crypto_webhook))
}

/// Hosted checkout initiation.
///
/// # Routes
/// - `POST /paystack` - card checkout
/// - `POST /crypto` - crypto invoice
pub fn checkout_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/paystack", post(create_paystack_checkout))
        .route("/crypto", post(create_crypto_checkout))
}

/// Billing API, suitable for mounting at `/api`.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/webhooks", webhook_routes())
        .nest("/checkout", checkout_routes())
}

/// Complete application router with state applied.
///
/// ```ignore
/// let app = billing_app(state).layer(TraceLayer::new_for_http());
/// ```
pub fn billing_app(state: BillingAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", billing_router())
        .with_state(state)
}
