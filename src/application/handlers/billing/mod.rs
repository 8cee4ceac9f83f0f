//! Billing handlers: payment webhooks and checkout initiation.

mod create_checkout;
mod handle_crypto_webhook;
mod handle_paystack_webhook;
mod webhook_outcome;

pub use create_checkout::{CheckoutError, CreateCheckoutCommand, CreateCheckoutHandler};
pub use handle_crypto_webhook::{
    HandleCryptoWebhookCommand, HandleCryptoWebhookHandler, NOWPAYMENTS_SIGNATURE_HEADER,
};
pub use handle_paystack_webhook::{
    HandlePaystackWebhookCommand, HandlePaystackWebhookHandler, PAYSTACK_SIGNATURE_HEADER,
};
pub use webhook_outcome::WebhookOutcome;
