//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SubscriberAccountRepository` - keyed overwrite of account billing fields
//! - `CheckoutProvider` - hosted checkout with a payment gateway

mod checkout_provider;
mod subscriber_account_repository;

pub use checkout_provider::{
    CheckoutProvider, CheckoutRequest, CheckoutSession, PaymentError, PaymentErrorCode,
};
pub use subscriber_account_repository::SubscriberAccountRepository;
