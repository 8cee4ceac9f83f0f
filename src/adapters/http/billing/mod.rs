//! Billing HTTP adapter: payment webhooks, checkout, and health.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CheckoutRequest, CryptoCheckoutResponse, ErrorResponse, HealthResponse,
    PaystackCheckoutResponse, WebhookAckResponse,
};
pub use handlers::{BillingApiError, BillingAppState};
pub use routes::{billing_app, billing_router, checkout_routes, webhook_routes};
