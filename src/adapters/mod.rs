//! Adapters - Implementations of port interfaces.
//!
//! - `http` - Axum routes for webhooks, checkout, and health
//! - `postgres` - `profiles` table persistence
//! - `memory` - In-memory persistence for tests and local development
//! - `paystack` / `nowpayments` - Payment gateway REST clients

pub mod http;
pub mod memory;
pub mod nowpayments;
pub mod paystack;
pub mod postgres;
