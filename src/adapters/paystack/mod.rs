//! Paystack adapter: card checkout initialization.
//!
//! Webhook verification for Paystack lives in the billing domain; this
//! module only talks to the Paystack REST API.

mod api_types;
mod paystack_adapter;

pub use api_types::{
    InitializeTransactionRequest, InitializedTransaction, PaystackResponse, TransactionMetadata,
};
pub use paystack_adapter::{PaystackCheckoutAdapter, PaystackCheckoutConfig};
