//! Subscription profile storage
//!
//! All plan mutations run as single UPDATE statements that write the plan
//! and both limits together, so the plan/limits pairing holds after every
//! write. Deliveries racing on the same profile are last-write-wins.

use sqlx::PgPool;
use uuid::Uuid;

use ledgerly_shared::{Plan, UserProfile};

use crate::error::BillingResult;

/// Storage service for per-user subscription profiles
#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a profile by user id
    pub async fn get(&self, user_id: Uuid) -> BillingResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Fetch a profile, creating one with free-tier defaults if absent
    pub async fn get_or_create(&self, user_id: Uuid) -> BillingResult<UserProfile> {
        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Fetch a profile by its Stripe customer id
    pub async fn find_by_customer(&self, customer_id: &str) -> BillingResult<Option<UserProfile>> {
        if customer_id.is_empty() {
            return Ok(None);
        }

        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE stripe_customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Put a user on a plan, recording the Stripe identifiers that back it
    ///
    /// Returns false when no profile row matched the user id.
    pub async fn activate_plan(
        &self,
        user_id: Uuid,
        plan: Plan,
        customer_id: &str,
        subscription_id: &str,
    ) -> BillingResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_profiles
            SET plan = $2,
                transaction_limit = $3,
                budget_limit = $4,
                stripe_customer_id = $5,
                stripe_subscription_id = $6,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(plan)
        .bind(plan.transaction_limit())
        .bind(plan.budget_limit())
        .bind(customer_id)
        .bind(subscription_id)
        .execute(&self.pool)
        .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            tracing::info!(
                user_id = %user_id,
                plan = %plan,
                customer_id = %customer_id,
                "Activated plan"
            );
        }

        Ok(updated)
    }

    /// Drop the profile behind a Stripe customer back to the free tier
    ///
    /// `clear_subscription` additionally empties the stored subscription id
    /// (subscription deleted, as opposed to merely lapsed). Returns false
    /// when no profile matched the customer id.
    pub async fn revoke_paid_plan(
        &self,
        customer_id: &str,
        clear_subscription: bool,
    ) -> BillingResult<bool> {
        if customer_id.is_empty() {
            return Ok(false);
        }

        let plan = Plan::Free;
        let result = if clear_subscription {
            sqlx::query(
                r#"
                UPDATE user_profiles
                SET plan = $2,
                    transaction_limit = $3,
                    budget_limit = $4,
                    stripe_subscription_id = '',
                    updated_at = NOW()
                WHERE stripe_customer_id = $1
                "#,
            )
            .bind(customer_id)
            .bind(plan)
            .bind(plan.transaction_limit())
            .bind(plan.budget_limit())
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE user_profiles
                SET plan = $2,
                    transaction_limit = $3,
                    budget_limit = $4,
                    updated_at = NOW()
                WHERE stripe_customer_id = $1
                "#,
            )
            .bind(customer_id)
            .bind(plan)
            .bind(plan.transaction_limit())
            .bind(plan.budget_limit())
            .execute(&self.pool)
            .await?
        };

        let updated = result.rows_affected() > 0;
        if updated {
            tracing::info!(
                customer_id = %customer_id,
                cleared_subscription = clear_subscription,
                "Downgraded profile to free tier"
            );
        }

        Ok(updated)
    }
}
