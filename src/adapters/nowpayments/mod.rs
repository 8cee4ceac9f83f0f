//! NOWPayments adapter: crypto invoice creation.

mod api_types;
mod nowpayments_adapter;

pub use api_types::{CreateInvoiceRequest, Invoice};
pub use nowpayments_adapter::{NowPaymentsCheckoutAdapter, NowPaymentsCheckoutConfig};
