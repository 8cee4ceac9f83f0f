//! HTTP adapters - REST API implementations.

pub mod billing;

pub use billing::{billing_app, billing_router, BillingAppState};
