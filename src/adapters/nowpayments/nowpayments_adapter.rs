//! NOWPayments checkout adapter.
//!
//! Creates a hosted crypto invoice. `order_id` and `order_description` are
//! echoed on the IPN, so they carry the user id and plan tag.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::billing::PaymentProviderKind;
use crate::ports::{
    CheckoutProvider, CheckoutRequest, CheckoutSession, PaymentError, PaymentErrorCode,
};

use super::api_types::{ApiErrorBody, CreateInvoiceRequest, Invoice};

/// NOWPayments API configuration.
#[derive(Clone)]
pub struct NowPaymentsCheckoutConfig {
    api_key: Option<SecretString>,
    api_base_url: String,
    price_amount: f64,
    price_currency: String,
    ipn_callback_url: Option<String>,
    success_url: Option<String>,
    cancel_url: Option<String>,
}

impl NowPaymentsCheckoutConfig {
    pub fn new(api_key: Option<SecretString>, price_amount: f64, price_currency: impl Into<String>) -> Self {
        Self {
            api_key,
            api_base_url: "https://api.nowpayments.io".to_string(),
            price_amount,
            price_currency: price_currency.into(),
            ipn_callback_url: None,
            success_url: None,
            cancel_url: None,
        }
    }

    /// Set a custom API base URL (for testing or the sandbox).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_ipn_callback_url(mut self, url: Option<String>) -> Self {
        self.ipn_callback_url = url;
        self
    }

    pub fn with_redirect_urls(mut self, success_url: Option<String>, cancel_url: Option<String>) -> Self {
        self.success_url = success_url;
        self.cancel_url = cancel_url;
        self
    }
}

/// NOWPayments checkout adapter.
pub struct NowPaymentsCheckoutAdapter {
    config: NowPaymentsCheckoutConfig,
    http_client: reqwest::Client,
}

impl NowPaymentsCheckoutAdapter {
    pub fn new(config: NowPaymentsCheckoutConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn invoice_request(&self, request: &CheckoutRequest) -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            price_amount: self.config.price_amount,
            price_currency: self.config.price_currency.clone(),
            order_id: request.user_id.to_string(),
            order_description: request.plan.as_str().to_string(),
            ipn_callback_url: self.config.ipn_callback_url.clone(),
            success_url: self.config.success_url.clone(),
            cancel_url: self.config.cancel_url.clone(),
        }
    }
}

#[async_trait]
impl CheckoutProvider for NowPaymentsCheckoutAdapter {
    fn kind(&self) -> PaymentProviderKind {
        PaymentProviderKind::NowPayments
    }

    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| PaymentError::not_configured("NOWPayments API key"))?;

        let url = format!("{}/v1/invoice", self.config.api_base_url);
        let body = self.invoice_request(&request);

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PaymentError::authentication("NOWPayments rejected the API key"));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PaymentError::new(
                PaymentErrorCode::RateLimitExceeded,
                "NOWPayments rate limit exceeded",
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&error_text)
                .ok()
                .and_then(|b| b.message.or(b.code))
                .unwrap_or(error_text);
            tracing::error!(status = %status, error = %detail, "NOWPayments invoice failed");
            return Err(PaymentError::provider(format!("NOWPayments API error: {}", detail))
                .with_provider_code(status.as_str()));
        }

        let invoice: Invoice = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse NOWPayments response: {}", e))
        })?;

        Ok(CheckoutSession {
            reference: invoice.id,
            url: invoice.invoice_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::Plan;
    use crate::domain::foundation::UserId;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            user_id: UserId::new("u1").unwrap(),
            email: "trader@example.com".to_string(),
            plan: Plan::Pro,
        }
    }

    #[test]
    fn invoice_carries_user_and_plan() {
        let adapter = NowPaymentsCheckoutAdapter::new(
            NowPaymentsCheckoutConfig::new(None, 9.99, "usd")
                .with_ipn_callback_url(Some("https://api.example.com/api/webhooks/crypto".to_string()))
                .with_redirect_urls(Some("https://app.example.com/ok".to_string()), None),
        );

        let body = adapter.invoice_request(&request());

        assert_eq!(body.order_id, "u1");
        assert_eq!(body.order_description, "pro");
        assert_eq!(body.price_currency, "usd");
        assert!(body.cancel_url.is_none());
        assert_eq!(
            body.ipn_callback_url.as_deref(),
            Some("https://api.example.com/api/webhooks/crypto")
        );
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let adapter = NowPaymentsCheckoutAdapter::new(NowPaymentsCheckoutConfig::new(None, 9.99, "usd"));

        let err = adapter.create_checkout(request()).await.unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::NotConfigured);
        assert!(!err.retryable);
    }
}
