//! CreateCheckoutHandler - Starts a hosted checkout for a plan upgrade.

use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::billing::Plan;
use crate::domain::foundation::UserId;
use crate::ports::{CheckoutProvider, CheckoutRequest, CheckoutSession, PaymentErrorCode};

/// Command to start a checkout.
#[derive(Debug, Clone, Default)]
pub struct CreateCheckoutCommand {
    pub email: Option<String>,
    pub user_id: Option<String>,
    /// Defaults to the upgrade tier.
    pub plan: Option<String>,
}

/// Errors when starting a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Plan '{0}' cannot be purchased")]
    UnsupportedPlan(String),

    #[error("Payment provider not configured: {0}")]
    NotConfigured(String),

    #[error("Payment provider error: {0}")]
    Provider(String),
}

impl CheckoutError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::MissingField(_) | CheckoutError::UnsupportedPlan(_) => {
                StatusCode::BAD_REQUEST
            }
            CheckoutError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CheckoutError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Handler that validates a checkout request and forwards it to one gateway.
pub struct CreateCheckoutHandler {
    provider: Arc<dyn CheckoutProvider>,
    upgrade_plan: Plan,
}

impl CreateCheckoutHandler {
    pub fn new(provider: Arc<dyn CheckoutProvider>, upgrade_plan: Plan) -> Self {
        Self {
            provider,
            upgrade_plan,
        }
    }

    pub async fn handle(&self, cmd: CreateCheckoutCommand) -> Result<CheckoutSession, CheckoutError> {
        let email = required(cmd.email, "email")?;
        let user_id = required(cmd.user_id, "userId")
            .and_then(|id| UserId::new(id).map_err(|_| CheckoutError::MissingField("userId")))?;

        let plan = match cmd.plan.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            None => self.upgrade_plan,
            Some(tag) => match tag.parse::<Plan>() {
                Ok(plan) if plan == self.upgrade_plan => plan,
                _ => return Err(CheckoutError::UnsupportedPlan(tag.to_string())),
            },
        };

        let provider = self.provider.kind();
        let session = self
            .provider
            .create_checkout(CheckoutRequest {
                user_id: user_id.clone(),
                email,
                plan,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    provider = %provider,
                    user_id = %user_id,
                    error = %e,
                    "Checkout creation failed"
                );
                match e.code {
                    PaymentErrorCode::NotConfigured => CheckoutError::NotConfigured(e.message),
                    _ => CheckoutError::Provider(e.message),
                }
            })?;

        tracing::info!(
            provider = %provider,
            user_id = %user_id,
            plan = %plan,
            reference = %session.reference,
            "Checkout created"
        );

        Ok(session)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, CheckoutError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(CheckoutError::MissingField(field))
}
