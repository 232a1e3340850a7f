//! Webhook event decoding
//!
//! Verified Stripe events are decoded exactly once, at the dispatcher
//! boundary, into a variant over the event kinds this service acts on.
//! Everything else lands in `Unknown` and is accepted without processing.

use std::collections::HashMap;

use stripe::{CheckoutSession, Event, EventObject, EventType, Subscription, SubscriptionStatus};
use uuid::Uuid;

use ledgerly_shared::Plan;

use crate::error::{BillingError, BillingResult};

/// A verified webhook event, narrowed to the kinds the reconcilers handle
#[derive(Debug)]
pub enum BillingEvent {
    /// A hosted checkout finished; first linkage of user to Stripe ids
    CheckoutCompleted(Box<CheckoutSession>),
    /// Subscription state changed at Stripe
    SubscriptionUpdated(Box<Subscription>),
    /// Subscription removed at Stripe
    SubscriptionDeleted(Box<Subscription>),
    /// Any other event type; accepted and ignored
    Unknown(String),
}

impl BillingEvent {
    /// Decode a verified Stripe event into its billing variant
    ///
    /// A recognized event type carrying the wrong payload object is an
    /// error; unrecognized event types are not.
    pub fn from_event(event: Event) -> BillingResult<Self> {
        match event.type_ {
            EventType::CheckoutSessionCompleted => match event.data.object {
                EventObject::CheckoutSession(session) => {
                    Ok(Self::CheckoutCompleted(Box::new(session)))
                }
                _ => Err(BillingError::InvalidArgument(
                    "checkout.session.completed without a checkout session payload".to_string(),
                )),
            },
            EventType::CustomerSubscriptionUpdated => match event.data.object {
                EventObject::Subscription(subscription) => {
                    Ok(Self::SubscriptionUpdated(Box::new(subscription)))
                }
                _ => Err(BillingError::InvalidArgument(
                    "customer.subscription.updated without a subscription payload".to_string(),
                )),
            },
            EventType::CustomerSubscriptionDeleted => match event.data.object {
                EventObject::Subscription(subscription) => {
                    Ok(Self::SubscriptionDeleted(Box::new(subscription)))
                }
                _ => Err(BillingError::InvalidArgument(
                    "customer.subscription.deleted without a subscription payload".to_string(),
                )),
            },
            other => Ok(Self::Unknown(other.to_string())),
        }
    }
}

/// Subscription statuses that revoke the paid plan
pub fn status_revokes_plan(status: SubscriptionStatus) -> bool {
    matches!(
        status,
        SubscriptionStatus::Canceled | SubscriptionStatus::Unpaid | SubscriptionStatus::PastDue
    )
}

/// Plan tag from checkout metadata, defaulting to Pro when absent
pub(crate) fn plan_from_metadata(metadata: Option<&HashMap<String, String>>) -> Plan {
    metadata
        .and_then(|m| m.get("plan"))
        .and_then(|tag| Plan::from_str(tag))
        .unwrap_or(Plan::Pro)
}

/// User id from checkout metadata; None when absent or unparseable
pub(crate) fn user_id_from_metadata(metadata: Option<&HashMap<String, String>>) -> Option<Uuid> {
    metadata
        .and_then(|m| m.get("user_id"))
        .and_then(|id| Uuid::parse_str(id).ok())
}

/// Customer id carried on a checkout session, empty when absent
pub(crate) fn session_customer_id(session: &CheckoutSession) -> String {
    match &session.customer {
        Some(stripe::Expandable::Id(id)) => id.to_string(),
        Some(stripe::Expandable::Object(customer)) => customer.id.to_string(),
        None => String::new(),
    }
}

/// Subscription id carried on a checkout session, empty when absent
pub(crate) fn session_subscription_id(session: &CheckoutSession) -> String {
    match &session.subscription {
        Some(stripe::Expandable::Id(id)) => id.to_string(),
        Some(stripe::Expandable::Object(subscription)) => subscription.id.to_string(),
        None => String::new(),
    }
}

/// Customer id of a subscription event payload
pub(crate) fn subscription_customer_id(subscription: &Subscription) -> String {
    match &subscription.customer {
        stripe::Expandable::Id(id) => id.to_string(),
        stripe::Expandable::Object(customer) => customer.id.to_string(),
    }
}
