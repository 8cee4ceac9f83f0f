//! Subscriber account entity and the plan-upgrade value written to it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, UserId, ValidationError};

use super::Plan;

/// Payment provider that reported a successful payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProviderKind {
    /// Card payments.
    Paystack,
    /// Cryptocurrency payments.
    NowPayments,
}

impl PaymentProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProviderKind::Paystack => "paystack",
            PaymentProviderKind::NowPayments => "nowpayments",
        }
    }
}

impl fmt::Display for PaymentProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The billing-relevant slice of a `profiles` row.
///
/// Accounts are created at signup, outside this service. Billing only ever
/// overwrites `plan`, the provider reference and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberAccount {
    pub user_id: UserId,
    pub plan: Plan,
    pub paystack_customer_code: Option<String>,
    pub nowpayments_payment_id: Option<String>,
    pub updated_at: Timestamp,
}

impl SubscriberAccount {
    /// A freshly signed-up account.
    pub fn new_free(user_id: UserId, created_at: Timestamp) -> Self {
        Self {
            user_id,
            plan: Plan::Free,
            paystack_customer_code: None,
            nowpayments_payment_id: None,
            updated_at: created_at,
        }
    }

    /// Applies an upgrade as a full overwrite of the three billing fields.
    ///
    /// Applying the same upgrade twice leaves plan and reference unchanged.
    pub fn apply(&mut self, upgrade: &PlanUpgrade) {
        self.plan = upgrade.plan;
        match upgrade.provider {
            PaymentProviderKind::Paystack => {
                self.paystack_customer_code = Some(upgrade.customer_reference.clone())
            }
            PaymentProviderKind::NowPayments => {
                self.nowpayments_payment_id = Some(upgrade.customer_reference.clone())
            }
        }
        self.updated_at = upgrade.applied_at;
    }

    /// The stored reference for a given provider.
    pub fn customer_reference(&self, provider: PaymentProviderKind) -> Option<&str> {
        match provider {
            PaymentProviderKind::Paystack => self.paystack_customer_code.as_deref(),
            PaymentProviderKind::NowPayments => self.nowpayments_payment_id.as_deref(),
        }
    }
}

/// A verified instruction to move one account onto a paid plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanUpgrade {
    pub user_id: UserId,
    pub plan: Plan,
    pub provider: PaymentProviderKind,
    /// Paystack customer code or NOWPayments payment id.
    pub customer_reference: String,
    pub applied_at: Timestamp,
}

impl PlanUpgrade {
    /// Creates an upgrade stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the customer reference is blank.
    pub fn new(
        user_id: UserId,
        plan: Plan,
        provider: PaymentProviderKind,
        customer_reference: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let customer_reference = customer_reference.into().trim().to_string();
        if customer_reference.is_empty() {
            return Err(ValidationError::empty_field("customer_reference"));
        }
        Ok(Self {
            user_id,
            plan,
            provider,
            customer_reference,
            applied_at: Timestamp::now(),
        })
    }

    /// Overrides the application time.
    pub fn with_applied_at(mut self, applied_at: Timestamp) -> Self {
        self.applied_at = applied_at;
        self
    }
}
