//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors)
//! - `billing` - Plans, subscriber accounts, and payment webhook events

pub mod billing;
pub mod foundation;
