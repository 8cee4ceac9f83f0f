//! HandleCryptoWebhookHandler - Command handler for NOWPayments IPN callbacks.

use std::sync::Arc;

use secrecy::SecretString;

use crate::domain::billing::{
    canonical_json, NowPaymentsEvent, PaymentProviderKind, Plan, WebhookError,
    WebhookSignatureVerifier,
};
use crate::ports::SubscriberAccountRepository;

use super::webhook_outcome::{apply_decision, WebhookOutcome};

/// Header carrying the NOWPayments HMAC-SHA512 signature.
pub const NOWPAYMENTS_SIGNATURE_HEADER: &str = "x-nowpayments-sig";

/// Command to handle a NOWPayments IPN.
#[derive(Debug, Clone)]
pub struct HandleCryptoWebhookCommand {
    pub payload: Vec<u8>,
    pub signature: Option<String>,
}

/// Handler for NOWPayments IPN callbacks.
///
/// The signature covers the body with keys sorted, so the body is
/// canonicalized before verification. Only `finished` payments upgrade.
pub struct HandleCryptoWebhookHandler {
    repository: Arc<dyn SubscriberAccountRepository>,
    verifier: Option<WebhookSignatureVerifier>,
    upgrade_plan: Plan,
}

impl HandleCryptoWebhookHandler {
    /// `ipn_secret` is the NOWPayments IPN secret; `None` rejects every request.
    pub fn new(
        repository: Arc<dyn SubscriberAccountRepository>,
        ipn_secret: Option<SecretString>,
        upgrade_plan: Plan,
    ) -> Self {
        Self {
            repository,
            verifier: ipn_secret.map(WebhookSignatureVerifier::new),
            upgrade_plan,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleCryptoWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        let verifier = self.verifier.as_ref().ok_or_else(|| {
            tracing::error!("NOWPayments IPN secret not configured, rejecting webhook");
            WebhookError::MissingSecret("NOWPAYMENTS_IPN_SECRET")
        })?;

        let signature = cmd
            .signature
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingSignature(NOWPAYMENTS_SIGNATURE_HEADER))?;

        let canonical = canonical_json(&cmd.payload)?;
        verifier
            .verify(&canonical, signature, NOWPAYMENTS_SIGNATURE_HEADER)
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected NOWPayments IPN");
                e
            })?;

        let event = NowPaymentsEvent::parse(&cmd.payload)?;
        tracing::debug!(
            payment_id = %event.payment_id,
            status = event.payment_status.as_str(),
            "NOWPayments IPN authenticated"
        );

        apply_decision(
            self.repository.as_ref(),
            PaymentProviderKind::NowPayments,
            event.classify(self.upgrade_plan),
        )
        .await
    }
}
