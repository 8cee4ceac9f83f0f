//! PostgreSQL implementation of SubscriberAccountRepository.
//!
//! Billing fields live on the `profiles` table, keyed by the auth user's
//! UUID. Rows are created at signup; this adapter only updates them.

use crate::domain::billing::{PaymentProviderKind, Plan, PlanUpgrade, SubscriberAccount};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::SubscriberAccountRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const UPGRADE_PAYSTACK_SQL: &str = r#"
    UPDATE profiles SET
        plan = $2,
        paystack_customer_code = $3,
        updated_at = $4
    WHERE id = $1
"#;

const UPGRADE_NOWPAYMENTS_SQL: &str = r#"
    UPDATE profiles SET
        plan = $2,
        nowpayments_payment_id = $3,
        updated_at = $4
    WHERE id = $1
"#;

/// PostgreSQL implementation of the SubscriberAccountRepository port.
pub struct PostgresSubscriberAccountRepository {
    pool: PgPool,
}

impl PostgresSubscriberAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Billing columns of a `profiles` row.
#[derive(Debug, sqlx::FromRow)]
struct ProfileBillingRow {
    id: Uuid,
    plan: Option<String>,
    paystack_customer_code: Option<String>,
    nowpayments_payment_id: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProfileBillingRow> for SubscriberAccount {
    type Error = DomainError;

    fn try_from(row: ProfileBillingRow) -> Result<Self, Self::Error> {
        let plan = match row.plan.as_deref() {
            None => Plan::Free,
            Some(s) => s.parse::<Plan>().map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid plan value: {}", e))
            })?,
        };

        Ok(SubscriberAccount {
            user_id: UserId::new(row.id.to_string())?,
            plan,
            paystack_customer_code: row.paystack_customer_code,
            nowpayments_payment_id: row.nowpayments_payment_id,
            updated_at: row
                .updated_at
                .map(Timestamp::from_datetime)
                .unwrap_or_default(),
        })
    }
}

/// Profile ids are UUIDs; anything else cannot name an existing row.
fn profile_id(user_id: &UserId) -> Result<Uuid, DomainError> {
    user_id.to_uuid().map_err(|_| {
        DomainError::new(
            ErrorCode::AccountNotFound,
            format!("No profile can match non-UUID user id '{}'", user_id),
        )
    })
}

#[async_trait]
impl SubscriberAccountRepository for PostgresSubscriberAccountRepository {
    async fn apply_upgrade(&self, upgrade: &PlanUpgrade) -> Result<(), DomainError> {
        let id = profile_id(&upgrade.user_id)?;
        let sql = match upgrade.provider {
            PaymentProviderKind::Paystack => UPGRADE_PAYSTACK_SQL,
            PaymentProviderKind::NowPayments => UPGRADE_NOWPAYMENTS_SQL,
        };

        let result = sqlx::query(sql)
            .bind(id)
            .bind(upgrade.plan.as_str())
            .bind(&upgrade.customer_reference)
            .bind(upgrade.applied_at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Failed to update profile: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                "Profile not found",
            )
            .with_detail("user_id", upgrade.user_id.as_str()));
        }

        Ok(())
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriberAccount>, DomainError> {
        let id = match user_id.to_uuid() {
            Ok(id) => id,
            Err(_) => return Ok(None),
        };

        let row: Option<ProfileBillingRow> = sqlx::query_as(
            r#"
            SELECT id, plan, paystack_customer_code, nowpayments_payment_id, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find profile: {}", e))
        })?;

        row.map(SubscriberAccount::try_from).transpose()
    }
}
