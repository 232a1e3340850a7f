//! API routes

pub mod billing;
pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth::require_auth, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Public routes: the webhook authenticates by signature, the cancel
    // page is a static no-op
    let public_routes = Router::new()
        .route("/billing/webhook", post(billing::webhook))
        .route("/billing/cancel", get(billing::checkout_cancel));

    // Browser routes requiring a signed-in user
    let protected_routes = Router::new()
        .route("/billing/checkout/:plan", get(billing::checkout))
        .route("/billing/success", get(billing::checkout_success))
        .route("/billing/portal", get(billing::customer_portal))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(health_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
