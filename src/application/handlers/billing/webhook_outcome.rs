//! Shared result type and write step for payment webhook handlers.

use crate::domain::billing::{
    EventDecision, IgnoreReason, PaymentProviderKind, Plan, PlanUpgrade, WebhookError,
};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::SubscriberAccountRepository;

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Qualifying payment, account moved onto the paid plan.
    Upgraded { user_id: UserId, plan: Plan },
    /// Event acknowledged without side effects.
    Ignored { reason: IgnoreReason },
}

/// Applies a classified event to the store.
pub(crate) async fn apply_decision(
    repository: &dyn SubscriberAccountRepository,
    provider: PaymentProviderKind,
    decision: EventDecision,
) -> Result<WebhookOutcome, WebhookError> {
    match decision {
        EventDecision::Upgrade(upgrade) => record_upgrade(repository, upgrade).await,
        EventDecision::Ignore(reason) => {
            if reason == IgnoreReason::MissingCustomerReference {
                tracing::warn!(
                    provider = %provider,
                    "Qualifying payment has no customer reference, skipping upgrade"
                );
            } else {
                tracing::info!(provider = %provider, reason = %reason, "Webhook event ignored");
            }
            Ok(WebhookOutcome::Ignored { reason })
        }
    }
}

async fn record_upgrade(
    repository: &dyn SubscriberAccountRepository,
    upgrade: PlanUpgrade,
) -> Result<WebhookOutcome, WebhookError> {
    repository
        .apply_upgrade(&upgrade)
        .await
        .map_err(|e| write_error(&upgrade, e))?;

    tracing::info!(
        user_id = %upgrade.user_id,
        plan = %upgrade.plan,
        provider = %upgrade.provider,
        customer_reference = %upgrade.customer_reference,
        "Account upgraded"
    );

    Ok(WebhookOutcome::Upgraded {
        user_id: upgrade.user_id,
        plan: upgrade.plan,
    })
}

fn write_error(upgrade: &PlanUpgrade, err: DomainError) -> WebhookError {
    if err.is_not_found() {
        tracing::error!(
            user_id = %upgrade.user_id,
            provider = %upgrade.provider,
            "No account matched upgrade"
        );
        return WebhookError::AccountNotFound(upgrade.user_id.to_string());
    }

    tracing::error!(
        user_id = %upgrade.user_id,
        provider = %upgrade.provider,
        error = %err,
        "Failed to write upgrade"
    );
    WebhookError::Database(err.message)
}
