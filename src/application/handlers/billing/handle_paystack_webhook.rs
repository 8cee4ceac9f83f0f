//! HandlePaystackWebhookHandler - Command handler for Paystack charge webhooks.

use std::sync::Arc;

use secrecy::SecretString;

use crate::domain::billing::{
    PaymentProviderKind, PaystackEvent, Plan, WebhookError, WebhookSignatureVerifier,
};
use crate::ports::SubscriberAccountRepository;

use super::webhook_outcome::{apply_decision, WebhookOutcome};

/// Header carrying the Paystack HMAC-SHA512 signature.
pub const PAYSTACK_SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Command to handle a Paystack webhook.
#[derive(Debug, Clone)]
pub struct HandlePaystackWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Value of the signature header, if sent.
    pub signature: Option<String>,
}

/// Handler for Paystack webhooks.
///
/// Authenticates the body against the secret key, then upgrades the account
/// named in the charge metadata. Only `charge.success` for the configured
/// upgrade tier writes anything.
pub struct HandlePaystackWebhookHandler {
    repository: Arc<dyn SubscriberAccountRepository>,
    verifier: Option<WebhookSignatureVerifier>,
    upgrade_plan: Plan,
}

impl HandlePaystackWebhookHandler {
    /// `secret_key` is the Paystack secret key; `None` rejects every request.
    pub fn new(
        repository: Arc<dyn SubscriberAccountRepository>,
        secret_key: Option<SecretString>,
        upgrade_plan: Plan,
    ) -> Self {
        Self {
            repository,
            verifier: secret_key.map(WebhookSignatureVerifier::new),
            upgrade_plan,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaystackWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        // 1. Fail closed before touching the request
        let verifier = self.verifier.as_ref().ok_or_else(|| {
            tracing::error!("Paystack secret key not configured, rejecting webhook");
            WebhookError::MissingSecret("PAYSTACK_SECRET_KEY")
        })?;

        // 2. Authenticate raw bytes
        let signature = cmd.signature.as_deref().unwrap_or_default();
        verifier
            .verify(&cmd.payload, signature, PAYSTACK_SIGNATURE_HEADER)
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected Paystack webhook");
                e
            })?;

        // 3. Parse and classify
        let event = PaystackEvent::parse(&cmd.payload)?;
        tracing::debug!(
            event = %event.event,
            reference = ?event.reference(),
            "Paystack event authenticated"
        );

        apply_decision(
            self.repository.as_ref(),
            PaymentProviderKind::Paystack,
            event.classify(self.upgrade_plan),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{IgnoreReason, PlanUpgrade, SubscriberAccount};
    use crate::domain::foundation::{DomainError, ErrorCode, UserId};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const SECRET: &str = "sk_test_secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockAccountRepository {
        accounts: Mutex<Vec<SubscriberAccount>>,
        applied: Mutex<Vec<PlanUpgrade>>,
        fail_writes: bool,
    }

    impl MockAccountRepository {
        fn with_user(user_id: &str) -> Self {
            Self {
                accounts: Mutex::new(vec![SubscriberAccount::new_free(
                    UserId::new(user_id).unwrap(),
                    Default::default(),
                )]),
                applied: Mutex::new(Vec::new()),
                fail_writes: false,
            }
        }

        fn empty() -> Self {
            Self {
                accounts: Mutex::new(Vec::new()),
                applied: Mutex::new(Vec::new()),
                fail_writes: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::with_user("u1")
            }
        }

        fn applied(&self) -> Vec<PlanUpgrade> {
            self.applied.lock().unwrap().clone()
        }

        fn account(&self, user_id: &str) -> SubscriberAccount {
            self.accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.user_id.as_str() == user_id)
                .cloned()
                .unwrap()
        }
    }

    #[async_trait]
    impl SubscriberAccountRepository for MockAccountRepository {
        async fn apply_upgrade(&self, upgrade: &PlanUpgrade) -> Result<(), DomainError> {
            if self.fail_writes {
                return Err(DomainError::new(ErrorCode::DatabaseError, "connection reset"));
            }
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts
                .iter_mut()
                .find(|a| a.user_id == upgrade.user_id)
                .ok_or_else(|| DomainError::new(ErrorCode::AccountNotFound, "no account"))?;
            account.apply(upgrade);
            self.applied.lock().unwrap().push(upgrade.clone());
            Ok(())
        }

        async fn find_by_user_id(
            &self,
            user_id: &UserId,
        ) -> Result<Option<SubscriberAccount>, DomainError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.iter().find(|a| &a.user_id == user_id).cloned())
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn handler(repo: Arc<MockAccountRepository>) -> HandlePaystackWebhookHandler {
        HandlePaystackWebhookHandler::new(repo, Some(SecretString::new(SECRET.to_string())), Plan::Pro)
    }

    fn signed(body: serde_json::Value) -> HandlePaystackWebhookCommand {
        let payload = body.to_string().into_bytes();
        let signature = WebhookSignatureVerifier::new(SecretString::new(SECRET.to_string()))
            .sign(&payload);
        HandlePaystackWebhookCommand {
            payload,
            signature: Some(signature),
        }
    }

    fn charge(event: &str, metadata: serde_json::Value) -> serde_json::Value {
        json!({
            "event": event,
            "data": {
                "reference": "T123",
                "customer": { "customer_code": "CUS_abc" },
                "metadata": metadata
            }
        })
    }

    fn pro_charge() -> HandlePaystackWebhookCommand {
        signed(charge(
            "charge.success",
            json!({"userId": "u1", "plan": "pro", "upgrade": true}),
        ))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Upgrade Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn qualifying_charge_upgrades_account() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let result = handler(repo.clone()).handle(pro_charge()).await.unwrap();

        assert_eq!(
            result,
            WebhookOutcome::Upgraded {
                user_id: UserId::new("u1").unwrap(),
                plan: Plan::Pro
            }
        );
        let account = repo.account("u1");
        assert_eq!(account.plan, Plan::Pro);
        assert_eq!(account.paystack_customer_code.as_deref(), Some("CUS_abc"));
    }

    #[tokio::test]
    async fn replayed_charge_leaves_account_unchanged() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let handler = handler(repo.clone());

        handler.handle(pro_charge()).await.unwrap();
        let first = repo.account("u1");
        handler.handle(pro_charge()).await.unwrap();
        let second = repo.account("u1");

        assert_eq!(first.plan, second.plan);
        assert_eq!(first.paystack_customer_code, second.paystack_customer_code);
        assert_eq!(repo.applied().len(), 2);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Authentication Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_secret_fails_before_signature_check() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let handler = HandlePaystackWebhookHandler::new(repo.clone(), None, Plan::Pro);

        let mut cmd = pro_charge();
        cmd.signature = None;
        let err = handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::MissingSecret(_)));
        assert_eq!(err.status_code().as_u16(), 500);
        assert!(repo.applied().is_empty());
    }

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let mut cmd = pro_charge();
        cmd.signature = None;

        let err = handler(repo.clone()).handle(cmd).await.unwrap_err();

        assert!(matches!(
            err,
            WebhookError::MissingSignature(PAYSTACK_SIGNATURE_HEADER)
        ));
        assert!(repo.applied().is_empty());
    }

    #[tokio::test]
    async fn forged_signature_is_rejected() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let mut cmd = pro_charge();
        cmd.signature = Some("ab".repeat(64));

        let err = handler(repo.clone()).handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::InvalidSignature));
        assert!(repo.applied().is_empty());
    }

    #[tokio::test]
    async fn tampered_body_is_rejected() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let mut cmd = pro_charge();
        cmd.payload = charge("charge.success", json!({"userId": "u2", "plan": "pro"}))
            .to_string()
            .into_bytes();

        let err = handler(repo.clone()).handle(cmd).await.unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
    }

    #[tokio::test]
    async fn signed_garbage_is_parse_error() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let payload = b"{not json".to_vec();
        let signature = WebhookSignatureVerifier::new(SecretString::new(SECRET.to_string()))
            .sign(&payload);

        let err = handler(repo)
            .handle(HandlePaystackWebhookCommand {
                payload,
                signature: Some(signature),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::ParseError(_)));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Ignored Event Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn failed_charge_is_ignored() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let cmd = signed(charge("charge.failed", json!({"userId": "u1", "plan": "pro"})));

        let result = handler(repo.clone()).handle(cmd).await.unwrap();

        assert!(matches!(
            result,
            WebhookOutcome::Ignored {
                reason: IgnoreReason::UnhandledEvent(_)
            }
        ));
        assert!(repo.applied().is_empty());
    }

    #[tokio::test]
    async fn other_plan_is_ignored() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let cmd = signed(charge("charge.success", json!({"userId": "u1", "plan": "starter"})));

        let result = handler(repo.clone()).handle(cmd).await.unwrap();

        assert!(matches!(result, WebhookOutcome::Ignored { .. }));
        assert_eq!(repo.account("u1").plan, Plan::Free);
    }

    #[tokio::test]
    async fn other_event_data_shapes_are_acknowledged() {
        let bodies = [
            json!({"event": "paymentrequest.pending", "data": {"id": 1089700, "customer": 2360889}}),
            json!({"event": "subscription.disable", "data": null}),
            json!({"event": "transfer.success", "data": {"amount": 3000.5, "reference": 77}}),
        ];

        for body in bodies {
            let repo = Arc::new(MockAccountRepository::with_user("u1"));
            let result = handler(repo.clone()).handle(signed(body)).await.unwrap();

            assert!(matches!(
                result,
                WebhookOutcome::Ignored {
                    reason: IgnoreReason::UnhandledEvent(_)
                }
            ));
            assert!(repo.applied().is_empty());
        }
    }

    #[tokio::test]
    async fn numeric_reference_with_other_plan_is_ignored() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let cmd = signed(json!({
            "event": "charge.success",
            "data": {
                "reference": 4421,
                "customer": { "customer_code": "CUS_abc" },
                "metadata": {"userId": "u1", "plan": "starter"}
            }
        }));

        let result = handler(repo.clone()).handle(cmd).await.unwrap();

        assert!(matches!(result, WebhookOutcome::Ignored { .. }));
        assert!(repo.applied().is_empty());
    }

    #[tokio::test]
    async fn plan_tag_in_other_case_is_ignored() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let cmd = signed(charge("charge.success", json!({"userId": "u1", "plan": "Pro"})));

        let result = handler(repo.clone()).handle(cmd).await.unwrap();

        assert!(matches!(
            result,
            WebhookOutcome::Ignored {
                reason: IgnoreReason::PlanMismatch { .. }
            }
        ));
        assert!(repo.applied().is_empty());
    }

    #[tokio::test]
    async fn missing_user_id_is_ignored() {
        let repo = Arc::new(MockAccountRepository::with_user("u1"));
        let cmd = signed(charge("charge.success", json!({"plan": "pro"})));

        let result = handler(repo.clone()).handle(cmd).await.unwrap();

        assert_eq!(
            result,
            WebhookOutcome::Ignored {
                reason: IgnoreReason::MissingUserId
            }
        );
        assert!(repo.applied().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Write Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_account_is_server_error() {
        let repo = Arc::new(MockAccountRepository::empty());

        let err = handler(repo).handle(pro_charge()).await.unwrap_err();

        assert!(matches!(err, WebhookError::AccountNotFound(ref id) if id == "u1"));
        assert_eq!(err.status_code().as_u16(), 500);
    }

    #[tokio::test]
    async fn store_failure_is_server_error() {
        let repo = Arc::new(MockAccountRepository::failing());

        let err = handler(repo).handle(pro_charge()).await.unwrap_err();

        assert!(matches!(err, WebhookError::Database(_)));
        assert!(err.is_retryable());
    }
}
