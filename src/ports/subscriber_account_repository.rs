//! Subscriber account repository port.
//!
//! The billing write path needs exactly one operation: a keyed overwrite of
//! an account's plan and provider reference. Implementations must perform it
//! as a single atomic statement so concurrent deliveries of the same event
//! converge on the same row state.

use crate::domain::billing::{PlanUpgrade, SubscriberAccount};
use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;

/// Repository port for subscriber billing fields.
#[async_trait]
pub trait SubscriberAccountRepository: Send + Sync {
    /// Overwrite plan, provider reference and `updated_at` for one account.
    ///
    /// Never creates an account. Applying the same upgrade twice leaves the
    /// row unchanged apart from `updated_at`.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if no account matches the user id, including ids
    ///   the store cannot represent
    /// - `DatabaseError` on persistence failure
    async fn apply_upgrade(&self, upgrade: &PlanUpgrade) -> Result<(), DomainError>;

    /// Find an account by user id.
    ///
    /// Returns `None` if the user has no account.
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriberAccount>, DomainError>;
}
