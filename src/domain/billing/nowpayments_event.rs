//! NOWPayments instant payment notification (IPN).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::foundation::UserId;

use super::decision::{match_plan, EventDecision, IgnoreReason};
use super::webhook_errors::WebhookError;
use super::{PaymentProviderKind, Plan, PlanUpgrade};

/// Lifecycle status reported by NOWPayments for a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Waiting,
    Confirming,
    Confirmed,
    Sending,
    PartiallyPaid,
    Finished,
    Failed,
    Refunded,
    Expired,
    Unknown(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Waiting => "waiting",
            PaymentStatus::Confirming => "confirming",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Sending => "sending",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Finished => "finished",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Unknown(s) => s,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "waiting" => PaymentStatus::Waiting,
            "confirming" => PaymentStatus::Confirming,
            "confirmed" => PaymentStatus::Confirmed,
            "sending" => PaymentStatus::Sending,
            "partially_paid" => PaymentStatus::PartiallyPaid,
            "finished" => PaymentStatus::Finished,
            "failed" => PaymentStatus::Failed,
            "refunded" => PaymentStatus::Refunded,
            "expired" => PaymentStatus::Expired,
            _ => PaymentStatus::Unknown(s),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(PaymentStatus::from)
    }
}

/// A NOWPayments IPN body.
#[derive(Debug, Clone, Deserialize)]
pub struct NowPaymentsEvent {
    /// Numeric in practice, sometimes delivered as a string.
    #[serde(deserialize_with = "id_as_string")]
    pub payment_id: String,

    pub payment_status: PaymentStatus,

    /// User id set at checkout.
    #[serde(default)]
    pub order_id: Option<String>,

    /// Plan tag set at checkout.
    #[serde(default)]
    pub order_description: Option<String>,

    #[serde(default)]
    pub price_amount: Option<f64>,

    #[serde(default)]
    pub price_currency: Option<String>,
}

fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "payment_id must be a string or number, got {}",
            other
        ))),
    }
}

impl NowPaymentsEvent {
    /// Parses an authenticated IPN body.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` if the body is not an IPN.
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// Decides whether this notification upgrades an account to `upgrade_plan`.
    pub fn classify(&self, upgrade_plan: Plan) -> EventDecision {
        match self.upgrade_for(upgrade_plan) {
            Ok(upgrade) => EventDecision::Upgrade(upgrade),
            Err(reason) => EventDecision::Ignore(reason),
        }
    }

    fn upgrade_for(&self, upgrade_plan: Plan) -> Result<PlanUpgrade, IgnoreReason> {
        if self.payment_status != PaymentStatus::Finished {
            return Err(IgnoreReason::UnhandledEvent(
                self.payment_status.as_str().to_string(),
            ));
        }

        let user_id = self
            .order_id
            .as_deref()
            .and_then(|id| UserId::new(id).ok())
            .ok_or(IgnoreReason::MissingUserId)?;
        let plan = match_plan(self.order_description.as_deref(), upgrade_plan)?;

        PlanUpgrade::new(
            user_id,
            plan,
            PaymentProviderKind::NowPayments,
            self.payment_id.as_str(),
        )
        .map_err(|_| IgnoreReason::MissingCustomerReference)
    }
}
