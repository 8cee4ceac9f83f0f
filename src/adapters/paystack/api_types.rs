//! Paystack API request and response types.

use serde::{Deserialize, Serialize};

/// Body of `POST /transaction/initialize`.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeTransactionRequest {
    pub email: String,
    /// Amount in the currency's minor unit (kobo for NGN).
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    pub metadata: TransactionMetadata,
}

/// Metadata echoed back on the `charge.success` webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    pub user_id: String,
    pub plan: String,
    pub upgrade: bool,
}

/// Standard Paystack response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PaystackResponse<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// `data` of a successful initialize call.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    #[serde(default)]
    pub access_code: Option<String>,
    pub reference: String,
}
