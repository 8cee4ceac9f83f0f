//! Paystack webhook event envelope.
//!
//! Only `event` is required. Everything under `data` is read leniently:
//! Paystack sends `metadata` as whatever the checkout attached (an object,
//! an empty string, or nothing at all), and other event types use their own
//! `data` shapes.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::foundation::UserId;

use super::decision::{match_plan, EventDecision, IgnoreReason};
use super::webhook_errors::WebhookError;
use super::{PaymentProviderKind, Plan, PlanUpgrade};

/// Event type that signals a completed card payment.
pub const CHARGE_SUCCESS: &str = "charge.success";

/// A Paystack webhook event.
///
/// `data` differs per event type (`paymentrequest.*` carries `customer` as an
/// integer id, `subscription.*` may send `null`), so it stays untyped and the
/// upgrade fields are looked up on demand.
#[derive(Debug, Clone, Deserialize)]
pub struct PaystackEvent {
    /// Event type, e.g. `charge.success`.
    pub event: String,

    #[serde(default)]
    pub data: Value,
}

/// Upgrade tags written into the transaction metadata at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeMetadata {
    pub user_id: Option<String>,
    pub plan: Option<String>,
    pub upgrade: Option<bool>,
}

impl UpgradeMetadata {
    /// Reads the upgrade tags from a metadata value.
    ///
    /// Returns `None` unless the value is a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };
        let upgrade = match object.get("upgrade") {
            Some(Value::Bool(flag)) => Some(*flag),
            Some(Value::String(s)) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        };

        Some(Self {
            user_id: text("userId"),
            plan: text("plan"),
            upgrade,
        })
    }
}

impl PaystackEvent {
    /// Parses an authenticated request body.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` if the body is not a Paystack event.
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// Transaction reference, string or numeric.
    pub fn reference(&self) -> Option<String> {
        match self.data.get("reference")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Customer code of the paying customer, if present.
    pub fn customer_code(&self) -> Option<&str> {
        self.data
            .get("customer")
            .and_then(|c| c.get("customer_code"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Upgrade tags from the event metadata, if it is an object.
    pub fn upgrade_metadata(&self) -> Option<UpgradeMetadata> {
        self.data.get("metadata").and_then(UpgradeMetadata::from_value)
    }

    /// Decides whether this event upgrades an account to `upgrade_plan`.
    pub fn classify(&self, upgrade_plan: Plan) -> EventDecision {
        match self.upgrade_for(upgrade_plan) {
            Ok(upgrade) => EventDecision::Upgrade(upgrade),
            Err(reason) => EventDecision::Ignore(reason),
        }
    }

    fn upgrade_for(&self, upgrade_plan: Plan) -> Result<PlanUpgrade, IgnoreReason> {
        if self.event != CHARGE_SUCCESS {
            return Err(IgnoreReason::UnhandledEvent(self.event.clone()));
        }

        let metadata = self.upgrade_metadata().ok_or(IgnoreReason::MissingMetadata)?;
        if metadata.upgrade == Some(false) {
            return Err(IgnoreReason::NotAnUpgrade);
        }

        let user_id = metadata
            .user_id
            .as_deref()
            .and_then(|id| UserId::new(id).ok())
            .ok_or(IgnoreReason::MissingUserId)?;
        let plan = match_plan(metadata.plan.as_deref(), upgrade_plan)?;
        let customer_code = self
            .customer_code()
            .ok_or(IgnoreReason::MissingCustomerReference)?;

        PlanUpgrade::new(user_id, plan, PaymentProviderKind::Paystack, customer_code)
            .map_err(|_| IgnoreReason::MissingCustomerReference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> PaystackEvent {
        PaystackEvent::parse(value.to_string().as_bytes()).unwrap()
    }

    fn charge_success(metadata: Value) -> PaystackEvent {
        event(json!({
            "event": "charge.success",
            "data": {
                "reference": "ref_123",
                "amount": 500000,
                "customer": { "customer_code": "CUS_abc", "email": "trader@example.com" },
                "metadata": metadata
            }
        }))
    }

    fn assert_ignored(event: &PaystackEvent, expected: IgnoreReason) {
        assert_eq!(event.classify(Plan::Pro), EventDecision::Ignore(expected));
    }

    // ══════════════════════════════════════════════════════════════
    // Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_minimal_event() {
        let e = PaystackEvent::parse(br#"{"event":"transfer.success"}"#).unwrap();
        assert_eq!(e.event, "transfer.success");
        assert!(e.customer_code().is_none());
        assert!(e.reference().is_none());
    }

    #[test]
    fn integer_customer_is_tolerated_on_other_events() {
        let e = event(json!({
            "event": "paymentrequest.pending",
            "data": { "id": 1089700, "customer": 2360889, "amount": 42000 }
        }));
        assert!(e.customer_code().is_none());
        assert_ignored(&e, IgnoreReason::UnhandledEvent("paymentrequest.pending".to_string()));
    }

    #[test]
    fn null_data_is_tolerated() {
        let e = event(json!({"event": "subscription.disable", "data": null}));
        assert!(e.upgrade_metadata().is_none());
        assert_ignored(&e, IgnoreReason::UnhandledEvent("subscription.disable".to_string()));
    }

    #[test]
    fn fractional_amount_is_tolerated() {
        let e = event(json!({"event": "transfer.success", "data": {"amount": 3000.5}}));
        assert_ignored(&e, IgnoreReason::UnhandledEvent("transfer.success".to_string()));
    }

    #[test]
    fn numeric_reference_is_read_as_text() {
        let e = event(json!({
            "event": "charge.success",
            "data": {
                "reference": 4421,
                "customer": { "customer_code": "CUS_abc" },
                "metadata": {"userId": "u1", "plan": "starter"}
            }
        }));
        assert_eq!(e.reference().as_deref(), Some("4421"));
        assert_ignored(
            &e,
            IgnoreReason::PlanMismatch {
                expected: Plan::Pro,
                found: Some("starter".to_string()),
            },
        );
    }

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(matches!(
            PaystackEvent::parse(b"not json"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_rejects_missing_event_type() {
        assert!(matches!(
            PaystackEvent::parse(br#"{"data":{}}"#),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn metadata_as_empty_string_is_tolerated() {
        let e = charge_success(json!(""));
        assert!(e.upgrade_metadata().is_none());
        assert_ignored(&e, IgnoreReason::MissingMetadata);
    }

    #[test]
    fn upgrade_flag_accepts_string_form() {
        let meta = UpgradeMetadata::from_value(&json!({"upgrade": "true"})).unwrap();
        assert_eq!(meta.upgrade, Some(true));
    }

    // ══════════════════════════════════════════════════════════════
    // Classification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn qualifying_charge_produces_upgrade() {
        let e = charge_success(json!({"userId": "u1", "plan": "pro", "upgrade": true}));

        match e.classify(Plan::Pro) {
            EventDecision::Upgrade(upgrade) => {
                assert_eq!(upgrade.user_id.as_str(), "u1");
                assert_eq!(upgrade.plan, Plan::Pro);
                assert_eq!(upgrade.provider, PaymentProviderKind::Paystack);
                assert_eq!(upgrade.customer_reference, "CUS_abc");
            }
            other => panic!("expected upgrade, got {:?}", other),
        }
    }

    #[test]
    fn upgrade_flag_is_optional() {
        let e = charge_success(json!({"userId": "u1", "plan": "pro"}));
        assert!(matches!(e.classify(Plan::Pro), EventDecision::Upgrade(_)));
    }

    #[test]
    fn other_event_types_are_ignored() {
        let e = event(json!({
            "event": "charge.failed",
            "data": {
                "customer": { "customer_code": "CUS_abc" },
                "metadata": {"userId": "u1", "plan": "pro"}
            }
        }));
        assert_ignored(&e, IgnoreReason::UnhandledEvent("charge.failed".to_string()));
    }

    #[test]
    fn missing_metadata_is_ignored() {
        let e = event(json!({
            "event": "charge.success",
            "data": { "customer": { "customer_code": "CUS_abc" } }
        }));
        assert_ignored(&e, IgnoreReason::MissingMetadata);
    }

    #[test]
    fn missing_user_id_is_ignored() {
        let e = charge_success(json!({"plan": "pro"}));
        assert_ignored(&e, IgnoreReason::MissingUserId);
    }

    #[test]
    fn user_id_is_passed_through_unchanged() {
        let e = charge_success(json!({"userId": " u1 ", "plan": "pro"}));
        match e.classify(Plan::Pro) {
            EventDecision::Upgrade(upgrade) => assert_eq!(upgrade.user_id.as_str(), " u1 "),
            other => panic!("expected upgrade, got {:?}", other),
        }
    }

    #[test]
    fn plan_tag_must_match_exactly() {
        for tag in ["Pro", "PRO", " pro "] {
            let e = charge_success(json!({"userId": "u1", "plan": tag}));
            assert_ignored(
                &e,
                IgnoreReason::PlanMismatch {
                    expected: Plan::Pro,
                    found: Some(tag.to_string()),
                },
            );
        }
    }

    #[test]
    fn blank_user_id_is_ignored() {
        let e = charge_success(json!({"userId": "  ", "plan": "pro"}));
        assert_ignored(&e, IgnoreReason::MissingUserId);
    }

    #[test]
    fn non_upgrade_plan_is_ignored() {
        let e = charge_success(json!({"userId": "u1", "plan": "starter"}));
        assert_ignored(
            &e,
            IgnoreReason::PlanMismatch {
                expected: Plan::Pro,
                found: Some("starter".to_string()),
            },
        );
    }

    #[test]
    fn upgrade_false_is_ignored() {
        let e = charge_success(json!({"userId": "u1", "plan": "pro", "upgrade": false}));
        assert_ignored(&e, IgnoreReason::NotAnUpgrade);
    }

    #[test]
    fn missing_customer_code_is_ignored() {
        let e = event(json!({
            "event": "charge.success",
            "data": { "metadata": {"userId": "u1", "plan": "pro"} }
        }));
        assert_ignored(&e, IgnoreReason::MissingCustomerReference);
    }

    #[test]
    fn configured_upgrade_tier_is_respected() {
        let e = charge_success(json!({"userId": "u1", "plan": "growth"}));
        assert!(matches!(e.classify(Plan::Growth), EventDecision::Upgrade(_)));
        assert!(matches!(e.classify(Plan::Pro), EventDecision::Ignore(_)));
    }
}
