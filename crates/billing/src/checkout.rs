//! Stripe Checkout sessions

use stripe::{
    CheckoutSession, CheckoutSessionMode, CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionPaymentMethodTypes,
};
use uuid::Uuid;

use ledgerly_shared::Plan;

use crate::client::StripeClient;
use crate::error::{BillingError, BillingResult};
use crate::events::{plan_from_metadata, session_customer_id, session_subscription_id};
use crate::profile::ProfileService;

/// Checkout service for creating and finalizing Stripe checkout sessions
pub struct CheckoutService {
    stripe: StripeClient,
    profiles: ProfileService,
}

impl CheckoutService {
    pub fn new(stripe: StripeClient, profiles: ProfileService) -> Self {
        Self { stripe, profiles }
    }

    /// Create a checkout session for a paid plan
    ///
    /// Ensures the user's profile row exists first, then requests a
    /// subscription-mode session scoped to the plan's price and tagged
    /// with `{user_id, plan}` metadata for webhook correlation.
    pub async fn create_subscription_checkout(
        &self,
        user_id: Uuid,
        email: &str,
        plan: Plan,
    ) -> BillingResult<CheckoutSession> {
        let price_id = self
            .stripe
            .config()
            .price_id_for_plan(plan)
            .ok_or_else(|| {
                BillingError::InvalidArgument(format!("no price configured for plan {}", plan))
            })?
            .to_string();

        self.profiles.get_or_create(user_id).await?;

        let base_url = &self.stripe.config().app_base_url;
        let success_url = format!(
            "{}/billing/success?session_id={{CHECKOUT_SESSION_ID}}",
            base_url
        );
        let cancel_url = format!("{}/billing/cancel", base_url);

        let mut metadata = std::collections::HashMap::new();
        metadata.insert("user_id".to_string(), user_id.to_string());
        metadata.insert("plan".to_string(), plan.to_string());

        let params = CreateCheckoutSession {
            customer_email: Some(email),
            mode: Some(CheckoutSessionMode::Subscription),
            payment_method_types: Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]),
            line_items: Some(vec![CreateCheckoutSessionLineItems {
                price: Some(price_id),
                quantity: Some(1),
                ..Default::default()
            }]),
            success_url: Some(&success_url),
            cancel_url: Some(&cancel_url),
            metadata: Some(metadata),
            ..Default::default()
        };

        let session = CheckoutSession::create(self.stripe.inner(), params).await?;

        tracing::info!(
            user_id = %user_id,
            session_id = %session.id,
            plan = %plan,
            "Created checkout session"
        );

        Ok(session)
    }

    /// Retrieve a checkout session by ID
    pub async fn get_session(&self, session_id: &str) -> BillingResult<CheckoutSession> {
        let session_id = session_id
            .parse::<stripe::CheckoutSessionId>()
            .map_err(|e| BillingError::InvalidArgument(format!("Invalid session ID: {}", e)))?;

        let session = CheckoutSession::retrieve(self.stripe.inner(), &session_id, &[]).await?;
        Ok(session)
    }

    /// Reconcile a user's profile from a finished checkout session
    ///
    /// Used by the post-redirect success handler. The session is re-fetched
    /// from Stripe rather than trusting anything the browser carried; the
    /// plan comes from session metadata (Pro when absent) and both Stripe
    /// identifiers are copied onto the profile.
    pub async fn finalize_for_user(&self, user_id: Uuid, session_id: &str) -> BillingResult<()> {
        let session = self.get_session(session_id).await?;

        let plan = plan_from_metadata(session.metadata.as_ref());
        let customer_id = session_customer_id(&session);
        let subscription_id = session_subscription_id(&session);

        let updated = self
            .profiles
            .activate_plan(user_id, plan, &customer_id, &subscription_id)
            .await?;

        if !updated {
            tracing::warn!(
                user_id = %user_id,
                session_id = %session_id,
                "Checkout success for user without a profile row"
            );
        }

        Ok(())
    }
}
