//! Paystack checkout adapter.
//!
//! Implements `CheckoutProvider` by initializing a Paystack transaction and
//! returning its hosted authorization URL. The user id and plan ride along
//! in the transaction metadata so the `charge.success` webhook can find the
//! account again.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::billing::PaymentProviderKind;
use crate::ports::{
    CheckoutProvider, CheckoutRequest, CheckoutSession, PaymentError, PaymentErrorCode,
};

use super::api_types::{
    InitializeTransactionRequest, InitializedTransaction, PaystackResponse, TransactionMetadata,
};

/// Paystack API configuration.
#[derive(Clone)]
pub struct PaystackCheckoutConfig {
    /// Secret key (sk_live_... or sk_test_...). Also signs webhooks.
    secret_key: Option<SecretString>,

    /// Base URL for the Paystack API.
    api_base_url: String,

    /// Price of the upgrade tier in minor units.
    amount_minor: i64,

    currency: String,

    /// Where Paystack redirects the payer after checkout.
    callback_url: Option<String>,
}

impl PaystackCheckoutConfig {
    pub fn new(secret_key: Option<SecretString>, amount_minor: i64, currency: impl Into<String>) -> Self {
        Self {
            secret_key,
            api_base_url: "https://api.paystack.co".to_string(),
            amount_minor,
            currency: currency.into(),
            callback_url: None,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_callback_url(mut self, url: Option<String>) -> Self {
        self.callback_url = url;
        self
    }
}

/// Paystack checkout adapter.
pub struct PaystackCheckoutAdapter {
    config: PaystackCheckoutConfig,
    http_client: reqwest::Client,
}

impl PaystackCheckoutAdapter {
    pub fn new(config: PaystackCheckoutConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn initialize_request(&self, request: CheckoutRequest) -> InitializeTransactionRequest {
        InitializeTransactionRequest {
            email: request.email,
            amount: self.config.amount_minor,
            currency: self.config.currency.clone(),
            callback_url: self.config.callback_url.clone(),
            metadata: TransactionMetadata {
                user_id: request.user_id.to_string(),
                plan: request.plan.as_str().to_string(),
                upgrade: true,
            },
        }
    }
}

#[async_trait]
impl CheckoutProvider for PaystackCheckoutAdapter {
    fn kind(&self) -> PaymentProviderKind {
        PaymentProviderKind::Paystack
    }

    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let secret_key = self
            .config
            .secret_key
            .as_ref()
            .ok_or_else(|| PaymentError::not_configured("Paystack secret key"))?;

        let url = format!("{}/transaction/initialize", self.config.api_base_url);
        let body = self.initialize_request(request);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(secret_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PaymentError::authentication("Paystack rejected the secret key"));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PaymentError::new(
                PaymentErrorCode::RateLimitExceeded,
                "Paystack rate limit exceeded",
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Paystack initialize failed");
            return Err(PaymentError::provider(format!("Paystack API error: {}", error_text))
                .with_provider_code(status.as_str()));
        }

        let envelope: PaystackResponse<InitializedTransaction> =
            response.json().await.map_err(|e| {
                PaymentError::provider(format!("Failed to parse Paystack response: {}", e))
            })?;

        match envelope.data {
            Some(data) if envelope.status => Ok(CheckoutSession {
                reference: data.reference,
                url: data.authorization_url,
            }),
            _ => Err(PaymentError::provider(format!(
                "Paystack API error: {}",
                envelope.message
            ))),
        }
    }
}
