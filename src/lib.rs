//! Journal Billing - subscription billing backend for the trading journal.
//!
//! Verifies Paystack and NOWPayments webhooks, upgrades subscriber accounts
//! on qualifying payments, and starts hosted checkouts with both providers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
