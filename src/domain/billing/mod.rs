//! Billing domain: plans, subscriber accounts, and payment webhook events.

mod account;
mod decision;
mod nowpayments_event;
mod paystack_event;
mod plan;
mod signature;
mod webhook_errors;

pub use account::{PaymentProviderKind, PlanUpgrade, SubscriberAccount};
pub use decision::{EventDecision, IgnoreReason};
pub use nowpayments_event::{NowPaymentsEvent, PaymentStatus};
pub use paystack_event::{PaystackEvent, UpgradeMetadata, CHARGE_SUCCESS};
pub use plan::Plan;
pub use signature::{canonical_json, WebhookSignatureVerifier};
pub use webhook_errors::WebhookError;
