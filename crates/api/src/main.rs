//! Ledgerly API server entry point

use std::sync::Arc;

use anyhow::Context;

use ledgerly_api::{routes::create_router, AppState, Config};
use ledgerly_billing::{BillingService, StripeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = ledgerly_shared::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    ledgerly_shared::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let stripe_config = StripeConfig::from_env().context("Failed to load Stripe configuration")?;
    let billing = BillingService::new(stripe_config, pool.clone());

    let bind_address = config.bind_address.clone();
    let state = AppState {
        pool,
        config: Arc::new(config),
        billing: Arc::new(billing),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!(address = %bind_address, "Ledgerly API listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
