//! Subscription plan definitions.
//!
//! Represents the plan tiers a trading-journal account can hold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subscription plan of a subscriber account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Assigned at signup.
    #[default]
    Free,
    Starter,
    Growth,
    Pro,
}

impl Plan {
    /// Stable lowercase tag used on the wire and in the `profiles.plan` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Growth => "growth",
            Plan::Pro => "pro",
        }
    }

    /// Returns true if this plan is billed.
    pub fn is_paid(&self) -> bool {
        !matches!(self, Plan::Free)
    }

    /// Returns the numeric rank of this plan for comparison.
    pub fn rank(&self) -> u8 {
        match self {
            Plan::Free => 0,
            Plan::Starter => 1,
            Plan::Growth => 2,
            Plan::Pro => 3,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Plan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "starter" => Ok(Plan::Starter),
            "growth" => Ok(Plan::Growth),
            "pro" => Ok(Plan::Pro),
            other => Err(ValidationError::invalid_format(
                "plan",
                format!("unknown plan '{}'", other),
            )),
        }
    }
}
