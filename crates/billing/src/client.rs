//! Stripe client configuration

use stripe::Client;

use ledgerly_shared::Plan;

use crate::error::{BillingError, BillingResult};

/// Configuration for Stripe billing
///
/// Every Stripe value is required and validated at boot; a missing key is a
/// startup error, not a silently unusable default.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Stripe secret API key
    pub secret_key: String,
    /// Stripe webhook signing secret
    pub webhook_secret: String,
    /// Price IDs for the paid plans
    pub price_ids: PriceIds,
    /// Base URL for success/cancel redirects
    pub app_base_url: String,
}

/// Stripe price IDs for the paid plans (monthly)
/// Plan hierarchy: Free (no price) → Pro → Enterprise
#[derive(Debug, Clone)]
pub struct PriceIds {
    pub pro: String,
    pub enterprise: String,
}

impl StripeConfig {
    /// Create config from environment variables
    pub fn from_env() -> BillingResult<Self> {
        Ok(Self {
            secret_key: std::env::var("STRIPE_SECRET_KEY")
                .map_err(|_| BillingError::Config("STRIPE_SECRET_KEY not set".to_string()))?,
            webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET")
                .map_err(|_| BillingError::Config("STRIPE_WEBHOOK_SECRET not set".to_string()))?,
            price_ids: PriceIds {
                pro: std::env::var("STRIPE_PRICE_PRO")
                    .map_err(|_| BillingError::Config("STRIPE_PRICE_PRO not set".to_string()))?,
                enterprise: std::env::var("STRIPE_PRICE_ENTERPRISE").map_err(|_| {
                    BillingError::Config("STRIPE_PRICE_ENTERPRISE not set".to_string())
                })?,
            },
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        })
    }

    /// Get the price ID for a paid plan; Free has no price
    pub fn price_id_for_plan(&self, plan: Plan) -> Option<&str> {
        match plan {
            Plan::Pro => Some(&self.price_ids.pro),
            Plan::Enterprise => Some(&self.price_ids.enterprise),
            Plan::Free => None,
        }
    }
}

/// Stripe billing client
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

impl StripeClient {
    /// Create a new Stripe client from config
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::new(&config.secret_key);
        Self { client, config }
    }

    /// Create a new Stripe client from environment variables
    pub fn from_env() -> BillingResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Get the inner Stripe client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the config
    pub fn config(&self) -> &StripeConfig {
        &self.config
    }
}
