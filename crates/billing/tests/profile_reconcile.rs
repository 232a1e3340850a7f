//! Integration tests for webhook-driven profile reconciliation
//!
//! These tests verify the plan/limits pairing after every reconciler
//! mutation, against a real database.
//!
//! ## Running Tests
//! ```bash
//! export DATABASE_URL="postgres://..."
//! cargo test -p ledgerly-billing -- --ignored
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use ledgerly_billing::ProfileService;
use ledgerly_shared::{Plan, UserProfile, FREE_BUDGET_LIMIT, FREE_TRANSACTION_LIMIT, UNLIMITED};
use sqlx::PgPool;
use uuid::Uuid;

// ============================================================================
// Test Utilities
// ============================================================================

async fn setup_pool() -> PgPool {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    ledgerly_shared::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Create a test user; profiles are created lazily by the service under test
async fn create_test_user(pool: &PgPool) -> Uuid {
    let user_id = Uuid::new_v4();

    sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
        .bind(user_id)
        .bind(format!("test-{}@example.com", user_id))
        .execute(pool)
        .await
        .expect("Failed to create test user");

    user_id
}

async fn fetch_profile(pool: &PgPool, user_id: Uuid) -> UserProfile {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Profile should exist")
}

async fn cleanup_user(pool: &PgPool, user_id: Uuid) {
    // Cascades to the profile
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to clean up test user");
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires database
async fn test_get_or_create_defaults_to_free_tier() {
    let pool = setup_pool().await;
    let user_id = create_test_user(&pool).await;
    let profiles = ProfileService::new(pool.clone());

    let profile = profiles.get_or_create(user_id).await.unwrap();
    assert_eq!(profile.plan, Plan::Free);
    assert_eq!(profile.transaction_limit, FREE_TRANSACTION_LIMIT);
    assert_eq!(profile.budget_limit, FREE_BUDGET_LIMIT);
    assert_eq!(profile.stripe_customer_id, "");
    assert_eq!(profile.stripe_subscription_id, "");
    assert!(profile.limits_consistent());

    // Second call returns the same row, no duplicate
    let again = profiles.get_or_create(user_id).await.unwrap();
    assert_eq!(again.user_id, profile.user_id);
    assert_eq!(again.created_at, profile.created_at);

    cleanup_user(&pool, user_id).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_activate_plan_sets_unlimited_limits_and_ids() {
    let pool = setup_pool().await;
    let user_id = create_test_user(&pool).await;
    let profiles = ProfileService::new(pool.clone());
    profiles.get_or_create(user_id).await.unwrap();

    let updated = profiles
        .activate_plan(user_id, Plan::Pro, "cus_test_1", "sub_test_1")
        .await
        .unwrap();
    assert!(updated);

    let profile = fetch_profile(&pool, user_id).await;
    assert_eq!(profile.plan, Plan::Pro);
    assert_eq!(profile.transaction_limit, UNLIMITED);
    assert_eq!(profile.budget_limit, UNLIMITED);
    assert_eq!(profile.stripe_customer_id, "cus_test_1");
    assert_eq!(profile.stripe_subscription_id, "sub_test_1");
    assert!(profile.limits_consistent());

    cleanup_user(&pool, user_id).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_activate_plan_for_unknown_user_is_noop() {
    let pool = setup_pool().await;
    let profiles = ProfileService::new(pool.clone());

    let updated = profiles
        .activate_plan(Uuid::new_v4(), Plan::Pro, "cus_missing", "sub_missing")
        .await
        .unwrap();
    assert!(!updated);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_lapsed_subscription_restores_free_limits() {
    let pool = setup_pool().await;
    let user_id = create_test_user(&pool).await;
    let profiles = ProfileService::new(pool.clone());
    profiles.get_or_create(user_id).await.unwrap();
    profiles
        .activate_plan(user_id, Plan::Enterprise, "cus_test_2", "sub_test_2")
        .await
        .unwrap();

    // customer.subscription.updated with a lapsed status keeps the
    // subscription id on record
    let updated = profiles.revoke_paid_plan("cus_test_2", false).await.unwrap();
    assert!(updated);

    let profile = fetch_profile(&pool, user_id).await;
    assert_eq!(profile.plan, Plan::Free);
    assert_eq!(profile.transaction_limit, FREE_TRANSACTION_LIMIT);
    assert_eq!(profile.budget_limit, FREE_BUDGET_LIMIT);
    assert_eq!(profile.stripe_subscription_id, "sub_test_2");
    assert!(profile.limits_consistent());

    cleanup_user(&pool, user_id).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_deleted_subscription_clears_subscription_id() {
    let pool = setup_pool().await;
    let user_id = create_test_user(&pool).await;
    let profiles = ProfileService::new(pool.clone());
    profiles.get_or_create(user_id).await.unwrap();
    profiles
        .activate_plan(user_id, Plan::Pro, "cus_test_3", "sub_test_3")
        .await
        .unwrap();

    let updated = profiles.revoke_paid_plan("cus_test_3", true).await.unwrap();
    assert!(updated);

    let profile = fetch_profile(&pool, user_id).await;
    assert_eq!(profile.plan, Plan::Free);
    assert_eq!(profile.transaction_limit, FREE_TRANSACTION_LIMIT);
    assert_eq!(profile.budget_limit, FREE_BUDGET_LIMIT);
    assert_eq!(profile.stripe_subscription_id, "");
    // Customer id survives deletion; the user can re-subscribe
    assert_eq!(profile.stripe_customer_id, "cus_test_3");
    assert!(profile.limits_consistent());

    cleanup_user(&pool, user_id).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_unknown_customer_lookups_are_noops() {
    let pool = setup_pool().await;
    let profiles = ProfileService::new(pool.clone());

    assert!(profiles
        .find_by_customer("cus_nobody")
        .await
        .unwrap()
        .is_none());
    assert!(profiles.find_by_customer("").await.unwrap().is_none());
    assert!(!profiles.revoke_paid_plan("cus_nobody", true).await.unwrap());
    assert!(!profiles.revoke_paid_plan("", false).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires database
async fn test_find_by_customer_after_activation() {
    let pool = setup_pool().await;
    let user_id = create_test_user(&pool).await;
    let profiles = ProfileService::new(pool.clone());
    profiles.get_or_create(user_id).await.unwrap();
    profiles
        .activate_plan(user_id, Plan::Pro, "cus_test_4", "sub_test_4")
        .await
        .unwrap();

    let found = profiles
        .find_by_customer("cus_test_4")
        .await
        .unwrap()
        .expect("Profile should be addressable by customer id");
    assert_eq!(found.user_id, user_id);
    assert_eq!(found.plan, Plan::Pro);

    cleanup_user(&pool, user_id).await;
}
