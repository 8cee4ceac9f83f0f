//! In-Memory Subscriber Account Repository
//!
//! Holds accounts in a map keyed by user id. Used by tests and by local
//! development when no database URL is configured.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::{PlanUpgrade, SubscriberAccount};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::SubscriberAccountRepository;

/// In-memory storage for subscriber accounts
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriberAccountRepository {
    accounts: Arc<RwLock<HashMap<UserId, SubscriberAccount>>>,
}

impl InMemorySubscriberAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a free account, as signup would.
    pub async fn insert_free(&self, user_id: UserId) {
        let account = SubscriberAccount::new_free(user_id.clone(), Timestamp::now());
        self.accounts.write().await.insert(user_id, account);
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl SubscriberAccountRepository for InMemorySubscriberAccountRepository {
    async fn apply_upgrade(&self, upgrade: &PlanUpgrade) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&upgrade.user_id).ok_or_else(|| {
            DomainError::new(ErrorCode::AccountNotFound, "Account not found")
                .with_detail("user_id", upgrade.user_id.as_str())
        })?;
        account.apply(upgrade);
        Ok(())
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriberAccount>, DomainError> {
        Ok(self.accounts.read().await.get(user_id).cloned())
    }
}
