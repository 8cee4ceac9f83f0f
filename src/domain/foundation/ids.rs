//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Subscriber identifier, as issued by the hosted auth service.
///
/// Opaque at the domain level. Storage adapters decide how to interpret it
/// (the Postgres adapter expects a UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty or blank.
    ///
    /// The identifier is kept exactly as given.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interprets the identifier as a UUID.
    pub fn to_uuid(&self) -> Result<Uuid, ValidationError> {
        Uuid::parse_str(&self.0)
            .map_err(|e| ValidationError::invalid_format("user_id", e.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
    }

    #[test]
    fn user_id_is_kept_verbatim() {
        let id = UserId::new("  u1 ").unwrap();
        assert_eq!(id.as_str(), "  u1 ");
        assert_ne!(id, UserId::new("u1").unwrap());
    }

    #[test]
    fn user_id_to_uuid_accepts_valid_uuid() {
        let raw = "1f0e4a52-8d6b-4c4e-9d5c-2f7a3b1e6c90";
        let id = UserId::new(raw).unwrap();
        assert_eq!(id.to_uuid().unwrap().to_string(), raw);
    }

    #[test]
    fn user_id_to_uuid_rejects_non_uuid() {
        let id = UserId::new("u1").unwrap();
        assert!(matches!(
            id.to_uuid(),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn user_id_deserializes_through_validation() {
        let id: UserId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.to_string(), "abc");

        let empty: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(empty.is_err());
    }
}
