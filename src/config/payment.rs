//! Payment configuration (Paystack and NOWPayments)

use secrecy::SecretString;
use serde::Deserialize;

use crate::domain::billing::Plan;

use super::error::ValidationError;

/// Payment configuration
///
/// Secrets are optional: a missing secret rejects the affected requests
/// with a 500 instead of preventing startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Tier granted by a qualifying payment
    #[serde(default = "default_upgrade_plan")]
    pub upgrade_plan: Plan,

    #[serde(default)]
    pub paystack: PaystackConfig,

    #[serde(default)]
    pub nowpayments: NowPaymentsConfig,
}

/// Paystack settings
#[derive(Debug, Clone, Deserialize)]
pub struct PaystackConfig {
    /// Secret key; authorizes API calls and signs webhooks
    pub secret_key: Option<String>,

    #[serde(default = "default_paystack_base_url")]
    pub api_base_url: String,

    /// Upgrade price in minor units (kobo)
    #[serde(default = "default_paystack_amount")]
    pub amount_minor: i64,

    #[serde(default = "default_paystack_currency")]
    pub currency: String,

    /// Redirect after card checkout
    pub callback_url: Option<String>,
}

/// NOWPayments settings
#[derive(Debug, Clone, Deserialize)]
pub struct NowPaymentsConfig {
    pub api_key: Option<String>,

    /// Signs IPN callbacks
    pub ipn_secret: Option<String>,

    #[serde(default = "default_nowpayments_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_nowpayments_amount")]
    pub price_amount: f64,

    #[serde(default = "default_nowpayments_currency")]
    pub price_currency: String,

    /// Public URL of `/api/webhooks/crypto`
    pub ipn_callback_url: Option<String>,

    pub success_url: Option<String>,

    pub cancel_url: Option<String>,
}

fn secret(value: &Option<String>) -> Option<SecretString> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| SecretString::new(s.to_string()))
}

fn check_url(url: &str, field: &'static str) -> Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ValidationError::InvalidUrl(field))
    }
}

fn check_optional_url(url: &Option<String>, field: &'static str) -> Result<(), ValidationError> {
    match url.as_deref() {
        Some(url) => check_url(url, field),
        None => Ok(()),
    }
}

impl PaymentConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.upgrade_plan.is_paid() {
            return Err(ValidationError::UpgradePlanNotPaid);
        }
        self.paystack.validate()?;
        self.nowpayments.validate()?;
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            upgrade_plan: default_upgrade_plan(),
            paystack: PaystackConfig::default(),
            nowpayments: NowPaymentsConfig::default(),
        }
    }
}

impl PaystackConfig {
    pub fn secret_key(&self) -> Option<SecretString> {
        secret(&self.secret_key)
    }

    /// Check if using a Paystack test key
    pub fn is_test_mode(&self) -> bool {
        self.secret_key
            .as_deref()
            .is_some_and(|k| k.starts_with("sk_test_"))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = self.secret_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            if !key.starts_with("sk_") {
                return Err(ValidationError::InvalidPaystackKey);
            }
        }
        if self.amount_minor <= 0 {
            return Err(ValidationError::NonPositiveAmount("paystack.amount_minor"));
        }
        check_url(&self.api_base_url, "paystack.api_base_url")?;
        check_optional_url(&self.callback_url, "paystack.callback_url")?;
        Ok(())
    }
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            api_base_url: default_paystack_base_url(),
            amount_minor: default_paystack_amount(),
            currency: default_paystack_currency(),
            callback_url: None,
        }
    }
}

impl NowPaymentsConfig {
    pub fn api_key(&self) -> Option<SecretString> {
        secret(&self.api_key)
    }

    pub fn ipn_secret(&self) -> Option<SecretString> {
        secret(&self.ipn_secret)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.price_amount.is_nan() || self.price_amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount("nowpayments.price_amount"));
        }
        check_url(&self.api_base_url, "nowpayments.api_base_url")?;
        check_optional_url(&self.ipn_callback_url, "nowpayments.ipn_callback_url")?;
        check_optional_url(&self.success_url, "nowpayments.success_url")?;
        check_optional_url(&self.cancel_url, "nowpayments.cancel_url")?;
        Ok(())
    }
}

impl Default for NowPaymentsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            ipn_secret: None,
            api_base_url: default_nowpayments_base_url(),
            price_amount: default_nowpayments_amount(),
            price_currency: default_nowpayments_currency(),
            ipn_callback_url: None,
            success_url: None,
            cancel_url: None,
        }
    }
}

fn default_upgrade_plan() -> Plan {
    Plan::Pro
}

fn default_paystack_base_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_paystack_amount() -> i64 {
    1_500_000
}

fn default_paystack_currency() -> String {
    "NGN".to_string()
}

fn default_nowpayments_base_url() -> String {
    "https://api.nowpayments.io".to_string()
}

fn default_nowpayments_amount() -> f64 {
    10.0
}

fn default_nowpayments_currency() -> String {
    "usd".to_string()
}
