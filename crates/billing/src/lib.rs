// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Ledgerly billing module
//!
//! Handles Stripe integration for subscription plans.
//!
//! ## Features
//!
//! - **Checkout**: Hosted checkout sessions for the paid plans
//! - **Profiles**: Per-user plan + limits records kept in sync with Stripe
//! - **Webhooks**: Signature-verified event dispatch and reconciliation
//! - **Portal**: Self-service billing portal sessions

pub mod checkout;
pub mod client;
pub mod error;
pub mod events;
pub mod portal;
pub mod profile;
pub mod webhooks;

// Checkout
pub use checkout::CheckoutService;

// Client
pub use client::{PriceIds, StripeClient, StripeConfig};

// Error
pub use error::{BillingError, BillingResult};

// Events
pub use events::{status_revokes_plan, BillingEvent};

// Portal
pub use portal::PortalService;

// Profile
pub use profile::ProfileService;

// Webhooks
pub use webhooks::WebhookHandler;

use sqlx::PgPool;

/// Main billing service that combines all billing functionality
pub struct BillingService {
    pub checkout: CheckoutService,
    pub portal: PortalService,
    pub profiles: ProfileService,
    pub webhooks: WebhookHandler,
}

impl BillingService {
    /// Create a new billing service with explicit config
    pub fn new(config: StripeConfig, pool: PgPool) -> Self {
        let stripe = StripeClient::new(config);
        let profiles = ProfileService::new(pool);

        Self {
            checkout: CheckoutService::new(stripe.clone(), profiles.clone()),
            portal: PortalService::new(stripe.clone()),
            profiles: profiles.clone(),
            webhooks: WebhookHandler::new(stripe, profiles),
        }
    }

    /// Create a new billing service from environment variables
    pub fn from_env(pool: PgPool) -> BillingResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config, pool))
    }
}
