//! Shared application state

use std::sync::Arc;

use ledgerly_billing::BillingService;
use sqlx::PgPool;

use crate::config::Config;

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub billing: Arc<BillingService>,
}
