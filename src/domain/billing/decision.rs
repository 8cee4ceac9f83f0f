//! Outcome of classifying an authenticated payment event.

use std::fmt;

use super::{Plan, PlanUpgrade};

/// What a verified webhook asks the system to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDecision {
    /// Qualifying payment: overwrite the account's billing fields.
    Upgrade(PlanUpgrade),
    /// Acknowledge without side effects.
    Ignore(IgnoreReason),
}

/// Why a verified event produced no write.
///
/// None of these are errors: providers send many events this service does
/// not act on, and each is acknowledged with a 2xx.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Event type or payment status is not an upgrade trigger.
    UnhandledEvent(String),
    /// No usable metadata object on the event.
    MissingMetadata,
    /// Metadata has no user identifier.
    MissingUserId,
    /// Metadata plan tag is absent or not the upgrade tier.
    PlanMismatch {
        expected: Plan,
        found: Option<String>,
    },
    /// Metadata explicitly marks the payment as not an upgrade.
    NotAnUpgrade,
    /// Qualifying event without a provider customer reference to store.
    MissingCustomerReference,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::UnhandledEvent(kind) => write!(f, "unhandled event '{}'", kind),
            IgnoreReason::MissingMetadata => write!(f, "missing metadata"),
            IgnoreReason::MissingUserId => write!(f, "missing user id"),
            IgnoreReason::PlanMismatch { expected, found } => match found {
                Some(found) => write!(f, "plan '{}' is not upgrade tier '{}'", found, expected),
                None => write!(f, "missing plan, upgrade tier is '{}'", expected),
            },
            IgnoreReason::NotAnUpgrade => write!(f, "payment not flagged as upgrade"),
            IgnoreReason::MissingCustomerReference => write!(f, "missing customer reference"),
        }
    }
}

/// Checks a metadata plan tag against the configured upgrade tier.
///
/// The tag must equal the tier's wire form byte for byte.
pub(crate) fn match_plan(tag: Option<&str>, upgrade_plan: Plan) -> Result<Plan, IgnoreReason> {
    match tag {
        Some(tag) if tag == upgrade_plan.as_str() => Ok(upgrade_plan),
        _ => Err(IgnoreReason::PlanMismatch {
            expected: upgrade_plan,
            found: tag.map(str::to_string),
        }),
    }
}
