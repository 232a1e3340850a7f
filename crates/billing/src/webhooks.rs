//! Stripe webhook handling
//!
//! Verifies inbound events against the signing secret, decodes them once,
//! and applies processor-reported subscription state to user profiles.

use stripe::{CheckoutSession, Event, Subscription, SubscriptionStatus, Webhook};

use crate::client::StripeClient;
use crate::error::{BillingError, BillingResult};
use crate::events::{
    plan_from_metadata, session_customer_id, session_subscription_id, status_revokes_plan,
    subscription_customer_id, user_id_from_metadata, BillingEvent,
};
use crate::profile::ProfileService;

/// Webhook handler for Stripe events
pub struct WebhookHandler {
    stripe: StripeClient,
    profiles: ProfileService,
}

impl WebhookHandler {
    pub fn new(stripe: StripeClient, profiles: ProfileService) -> Self {
        Self { stripe, profiles }
    }

    /// Verify and parse a Stripe webhook event
    ///
    /// Signature checking is delegated to the Stripe client library.
    /// Malformed payloads and bad signatures are both verification
    /// failures; neither causes any event processing.
    pub fn verify_event(&self, payload: &str, signature: &str) -> BillingResult<Event> {
        verify_signed_payload(payload, signature, &self.stripe.config().webhook_secret)
    }

    /// Dispatch a verified event to its reconciler
    ///
    /// Unrecognized event types are accepted and ignored so new Stripe
    /// event kinds never bounce deliveries.
    pub async fn handle_event(&self, event: Event) -> BillingResult<()> {
        let event_id = event.id.to_string();

        match BillingEvent::from_event(event)? {
            BillingEvent::CheckoutCompleted(session) => {
                self.handle_checkout_completed(*session).await
            }
            BillingEvent::SubscriptionUpdated(subscription) => {
                self.handle_subscription_updated(*subscription).await
            }
            BillingEvent::SubscriptionDeleted(subscription) => {
                self.handle_subscription_deleted(*subscription).await
            }
            BillingEvent::Unknown(event_type) => {
                tracing::info!(
                    event_type = %event_type,
                    event_id = %event_id,
                    "Received unhandled Stripe event type - no handler configured"
                );
                Ok(())
            }
        }
    }

    /// First linkage of a user to Stripe: the profile has no customer id
    /// yet, so the user is addressed by the metadata the checkout was
    /// tagged with.
    async fn handle_checkout_completed(&self, session: CheckoutSession) -> BillingResult<()> {
        let Some(user_id) = user_id_from_metadata(session.metadata.as_ref()) else {
            tracing::warn!(
                session_id = %session.id,
                "Checkout completed without user_id metadata"
            );
            return Ok(());
        };

        let plan = plan_from_metadata(session.metadata.as_ref());
        let customer_id = session_customer_id(&session);
        let subscription_id = session_subscription_id(&session);

        let updated = self
            .profiles
            .activate_plan(user_id, plan, &customer_id, &subscription_id)
            .await?;

        if !updated {
            tracing::debug!(
                user_id = %user_id,
                session_id = %session.id,
                "Checkout completion for unknown user"
            );
        }

        Ok(())
    }

    async fn handle_subscription_updated(&self, subscription: Subscription) -> BillingResult<()> {
        let customer_id = subscription_customer_id(&subscription);

        if subscription.status == SubscriptionStatus::Active {
            // Already correct from checkout completion
            tracing::debug!(
                customer_id = %customer_id,
                subscription_id = %subscription.id,
                "Subscription active; nothing to reconcile"
            );
            return Ok(());
        }

        if status_revokes_plan(subscription.status) {
            let updated = self.profiles.revoke_paid_plan(&customer_id, false).await?;
            if !updated {
                tracing::debug!(
                    customer_id = %customer_id,
                    "Subscription update for unknown customer"
                );
            }
        } else {
            tracing::debug!(
                customer_id = %customer_id,
                status = ?subscription.status,
                "Ignoring subscription status"
            );
        }

        Ok(())
    }

    async fn handle_subscription_deleted(&self, subscription: Subscription) -> BillingResult<()> {
        let customer_id = subscription_customer_id(&subscription);

        let updated = self.profiles.revoke_paid_plan(&customer_id, true).await?;
        if !updated {
            tracing::debug!(
                customer_id = %customer_id,
                "Subscription deletion for unknown customer"
            );
        }

        Ok(())
    }
}

fn verify_signed_payload(payload: &str, signature: &str, secret: &str) -> BillingResult<Event> {
    Webhook::construct_event(payload, signature, secret).map_err(|e| {
        tracing::warn!(error = %e, "Webhook verification failed");
        BillingError::WebhookSignatureInvalid
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_rejects_forged_signature() {
        let err = verify_signed_payload(
            r#"{"id":"evt_test","object":"event"}"#,
            "t=1700000000,v1=deadbeef",
            "whsec_test",
        )
        .unwrap_err();
        assert!(matches!(err, BillingError::WebhookSignatureInvalid));
    }

    #[test]
    fn test_verify_rejects_malformed_signature_header() {
        let err = verify_signed_payload("{}", "not-a-signature-header", "whsec_test").unwrap_err();
        assert!(matches!(err, BillingError::WebhookSignatureInvalid));
    }

    #[test]
    fn test_verify_rejects_empty_payload() {
        let err = verify_signed_payload("", "", "whsec_test").unwrap_err();
        assert!(matches!(err, BillingError::WebhookSignatureInvalid));
    }
}
